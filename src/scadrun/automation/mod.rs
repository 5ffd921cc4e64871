//! # Automation Dispatcher
//!
//! Delivers a logical [`Action`] to an external GUI application by picking an
//! automation backend for the current operating system.
//!
//! ## Dispatch Table
//!
//! The dispatcher holds one ordered list of candidate backends per [`OsKind`].
//! `deliver_action` walks the list for the requested OS:
//!
//! ```text
//! candidate 1 ──► Delivered          → Outcome::Delivered
//!             ──► PermissionDenied   → Outcome::PermissionDenied (stop)
//!             ──► NotInstalled       → next candidate
//!             ──► Failed             → next candidate (diagnostic kept)
//! ...
//! exhausted   ──► Outcome::BackendMissing (tried names, last failure)
//! ```
//!
//! Each candidate gets exactly one attempt. There are no retries and no state
//! survives between calls. `OsKind::Other` has no candidates, so it yields
//! `BackendMissing` without touching anything. `Outcome::Unknown` only comes
//! from macOS, where AppleScript is the sole backend and any failure other
//! than a permission denial is reported with its raw diagnostic.
//!
//! ## Backends
//!
//! - [`applescript::AppleScriptBackend`]: `osascript` + System Events (macOS)
//! - [`powershell::PowerShellBackend`]: WScript.Shell `AppActivate`/`SendKeys` (Windows)
//! - [`xdotool::XdotoolBackend`]: `xdotool windowactivate key` (X11)
//! - [`input::InputSimulationBackend`]: in-process key synthesis via `enigo`
//!
//! The first three activate the target window before typing. Input simulation
//! cannot, so its key lands in whatever window has focus.

use crate::clock::Clock;
use crate::config::ScadConfig;
use crate::model::{Action, OsKind, Outcome, Target};
use crate::process::ProcessRunner;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

pub mod applescript;
pub mod input;
pub mod powershell;
pub mod xdotool;

/// The backends that can appear in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "applescript")]
    AppleScript,
    #[serde(rename = "powershell")]
    PowerShell,
    #[serde(rename = "xdotool")]
    Xdotool,
    #[serde(rename = "input-simulation")]
    InputSimulation,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::AppleScript => "applescript",
            BackendKind::PowerShell => "powershell",
            BackendKind::Xdotool => "xdotool",
            BackendKind::InputSimulation => "input-simulation",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened when one backend was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Delivered,
    /// The backend's tool or input system is not available here
    NotInstalled(String),
    /// The OS refused to let us automate the UI
    PermissionDenied(String),
    /// The backend ran but the action did not go through
    Failed(String),
}

/// One way of delivering an action to an application.
pub trait AutomationBackend {
    fn name(&self) -> &str;

    /// Make exactly one delivery attempt. Must not panic.
    fn attempt(&self, target: &Target) -> Attempt;
}

impl<B: AutomationBackend + ?Sized> AutomationBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn attempt(&self, target: &Target) -> Attempt {
        (**self).attempt(target)
    }
}

/// Guidance shown when macOS refuses assistive access.
pub const MACOS_PERMISSION_GUIDANCE: &str = "Accessibility permission needed. \
To enable: System Settings > Privacy & Security > Accessibility, \
add the app running scadrun (your terminal or editor), then restart it. \
If macOS asked about controlling System Events, also allow it under \
Privacy & Security > Automation.";

/// Per-OS dispatch table of automation backends.
pub struct Dispatcher<'a> {
    table: HashMap<OsKind, Vec<Box<dyn AutomationBackend + 'a>>>,
}

impl Default for Dispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Dispatcher<'a> {
    /// An empty dispatcher: every OS yields `BackendMissing`.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Replaces the candidate list for an OS.
    pub fn with_candidates(
        mut self,
        os: OsKind,
        candidates: Vec<Box<dyn AutomationBackend + 'a>>,
    ) -> Self {
        self.table.insert(os, candidates);
        self
    }

    /// Builds the dispatch table from the configured backend order.
    pub fn from_config<R, C>(config: &ScadConfig, runner: &'a R, clock: &'a C) -> Self
    where
        R: ProcessRunner,
        C: Clock,
    {
        let mut dispatcher = Self::new();
        for &os in OsKind::all() {
            let candidates = config
                .backends
                .for_os(os)
                .iter()
                .map(|&kind| build_backend(kind, config, runner, clock))
                .collect();
            dispatcher = dispatcher.with_candidates(os, candidates);
        }
        dispatcher
    }

    /// Names of the candidates for an OS, in attempt order.
    pub fn candidate_names(&self, os: OsKind) -> Vec<String> {
        self.table
            .get(&os)
            .map(|list| list.iter().map(|b| b.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Delivers `action` to `app_name` on `os`. Never fails; every backend
    /// problem is folded into the returned [`Outcome`].
    pub fn deliver_action(&self, os: OsKind, app_name: &str, action: Action) -> Outcome {
        let candidates: &[Box<dyn AutomationBackend + 'a>] = match os {
            OsKind::Other => &[],
            _ => self.table.get(&os).map(Vec::as_slice).unwrap_or(&[]),
        };

        if candidates.is_empty() {
            warn!(%os, "no automation backend for this platform");
            return Outcome::BackendMissing {
                tried: Vec::new(),
                last_failure: None,
            };
        }

        let target = Target::new(app_name, action);
        let mut tried = Vec::with_capacity(candidates.len());
        let mut last_failure: Option<String> = None;

        for backend in candidates {
            let name = backend.name().to_string();
            debug!(backend = %name, app = app_name, action = action.label(), "attempting");
            let attempt = backend.attempt(&target);
            tried.push(name.clone());

            match attempt {
                Attempt::Delivered => {
                    info!(backend = %name, app = app_name, "sent {} key", action.label());
                    return Outcome::Delivered { backend: name };
                }
                Attempt::PermissionDenied(detail) => {
                    warn!(backend = %name, %detail, "automation permission denied");
                    return Outcome::PermissionDenied {
                        guidance: permission_guidance(os, &detail),
                    };
                }
                Attempt::NotInstalled(reason) => {
                    debug!(backend = %name, %reason, "backend not available");
                }
                Attempt::Failed(diagnostic) => {
                    debug!(backend = %name, %diagnostic, "backend failed");
                    last_failure = Some(format!("{}: {}", name, diagnostic));
                }
            }
        }

        match last_failure {
            Some(diagnostic) if os == OsKind::MacOs => Outcome::Unknown { diagnostic },
            last_failure => {
                info!(%os, tried = ?tried, "no automation backend delivered");
                Outcome::BackendMissing {
                    tried,
                    last_failure,
                }
            }
        }
    }
}

fn permission_guidance(os: OsKind, detail: &str) -> String {
    match os {
        OsKind::MacOs => MACOS_PERMISSION_GUIDANCE.to_string(),
        _ => format!("Permission denied while sending input: {}", detail),
    }
}

fn build_backend<'a, R, C>(
    kind: BackendKind,
    config: &ScadConfig,
    runner: &'a R,
    clock: &'a C,
) -> Box<dyn AutomationBackend + 'a>
where
    R: ProcessRunner,
    C: Clock,
{
    let delays = config.delays;
    match kind {
        BackendKind::AppleScript => Box::new(applescript::AppleScriptBackend::new(
            runner,
            delays.activate_settle(),
        )),
        BackendKind::PowerShell => Box::new(powershell::PowerShellBackend::new(
            runner,
            delays.activate_settle(),
        )),
        BackendKind::Xdotool => Box::new(xdotool::XdotoolBackend::new(runner)),
        BackendKind::InputSimulation => Box::new(input::InputSimulationBackend::new(
            clock,
            delays.input_settle(),
        )),
    }
}

/// Maps a spawn error to an attempt: a missing program means the backend
/// is not installed.
pub(crate) fn spawn_error_attempt(program: &str, err: std::io::Error) -> Attempt {
    if err.kind() == std::io::ErrorKind::NotFound {
        Attempt::NotInstalled(format!("'{}' not found", program))
    } else {
        Attempt::Failed(format!("could not run '{}': {}", program, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use crate::test_utils::{FakeInput, FakeRunner, ManualClock, ScriptedBackend};
    use std::time::Duration;

    fn boxed(backend: &ScriptedBackend) -> Box<dyn AutomationBackend + '_> {
        Box::new(backend)
    }

    #[test]
    fn test_macos_success_is_delivered() {
        let script = ScriptedBackend::new("applescript", Attempt::Delivered);
        let dispatcher = Dispatcher::new().with_candidates(OsKind::MacOs, vec![boxed(&script)]);

        let outcome = dispatcher.deliver_action(OsKind::MacOs, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::Delivered {
                backend: "applescript".to_string()
            }
        );
        assert_eq!(script.calls(), 1);
    }

    #[test]
    fn test_permission_denied_is_not_unknown() {
        let script = ScriptedBackend::new(
            "applescript",
            Attempt::PermissionDenied("not allowed to send keystrokes (1002)".into()),
        );
        let dispatcher = Dispatcher::new().with_candidates(OsKind::MacOs, vec![boxed(&script)]);

        let outcome = dispatcher.deliver_action(OsKind::MacOs, "OpenSCAD", Action::Render);

        match outcome {
            Outcome::PermissionDenied { guidance } => {
                assert!(guidance.contains("Accessibility"));
                assert!(guidance.contains("Privacy & Security > Automation"));
            }
            other => panic!("expected PermissionDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_permission_denied_stops_the_walk() {
        let first = ScriptedBackend::new("first", Attempt::PermissionDenied("nope".into()));
        let second = ScriptedBackend::new("second", Attempt::Delivered);
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Windows, vec![boxed(&first), boxed(&second)]);

        let outcome = dispatcher.deliver_action(OsKind::Windows, "OpenSCAD", Action::Render);

        assert!(matches!(outcome, Outcome::PermissionDenied { .. }));
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_all_missing_tries_each_once_in_order() {
        let log = ScriptedBackend::shared_log();
        let first = ScriptedBackend::new("xdotool", Attempt::NotInstalled("missing".into()))
            .with_log(&log);
        let second =
            ScriptedBackend::new("input-simulation", Attempt::NotInstalled("no display".into()))
                .with_log(&log);
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Linux, vec![boxed(&first), boxed(&second)]);

        let outcome = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::BackendMissing {
                tried: vec!["xdotool".to_string(), "input-simulation".to_string()],
                last_failure: None,
            }
        );
        assert_eq!(*log.borrow(), vec!["xdotool", "input-simulation"]);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[test]
    fn test_windows_all_missing_is_backend_missing() {
        let first = ScriptedBackend::new("powershell", Attempt::NotInstalled("missing".into()));
        let second = ScriptedBackend::new("input-simulation", Attempt::NotInstalled("x".into()));
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Windows, vec![boxed(&first), boxed(&second)]);

        let outcome = dispatcher.deliver_action(OsKind::Windows, "OpenSCAD", Action::Render);

        assert!(matches!(outcome, Outcome::BackendMissing { ref tried, .. } if tried.len() == 2));
    }

    #[test]
    fn test_linux_fallback_delivers_with_single_attempt() {
        let primary = ScriptedBackend::new("xdotool", Attempt::NotInstalled("missing".into()));
        let fallback = ScriptedBackend::new("input-simulation", Attempt::Delivered);
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Linux, vec![boxed(&primary), boxed(&fallback)]);

        let outcome = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::Delivered {
                backend: "input-simulation".to_string()
            }
        );
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn test_first_success_skips_remaining() {
        let primary = ScriptedBackend::new("xdotool", Attempt::Delivered);
        let fallback = ScriptedBackend::new("input-simulation", Attempt::Delivered);
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Linux, vec![boxed(&primary), boxed(&fallback)]);

        dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[test]
    fn test_exhausted_after_failure_is_backend_missing() {
        let primary = ScriptedBackend::new("xdotool", Attempt::Failed("no window".into()));
        let fallback =
            ScriptedBackend::new("input-simulation", Attempt::NotInstalled("no display".into()));
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Linux, vec![boxed(&primary), boxed(&fallback)]);

        let outcome = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::BackendMissing {
                tried: vec!["xdotool".to_string(), "input-simulation".to_string()],
                last_failure: Some("xdotool: no window".to_string()),
            }
        );
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn test_linux_chain_falls_back_to_input_simulation() {
        let runner = FakeRunner::new();
        runner.push_output("xdotool", CommandOutput::failure(1, "no window"));
        let clock = ManualClock::new();
        let keyboard = FakeInput::new();
        let candidates: Vec<Box<dyn AutomationBackend + '_>> = vec![
            Box::new(xdotool::XdotoolBackend::new(&runner)),
            Box::new(input::InputSimulationBackend::with_input(
                &clock,
                Duration::from_millis(300),
                keyboard.clone(),
            )),
        ];
        let dispatcher = Dispatcher::new().with_candidates(OsKind::Linux, candidates);

        let outcome = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::Delivered {
                backend: "input-simulation".to_string()
            }
        );
        assert_eq!(runner.programs(), vec!["xdotool"]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(300)]);
        assert_eq!(keyboard.clicks(), vec![enigo::Key::F6]);
    }

    #[test]
    fn test_windows_failure_then_fallback_delivers() {
        let primary = ScriptedBackend::new("powershell", Attempt::Failed("no window".into()));
        let fallback = ScriptedBackend::new("input-simulation", Attempt::Delivered);
        let dispatcher = Dispatcher::new()
            .with_candidates(OsKind::Windows, vec![boxed(&primary), boxed(&fallback)]);

        let outcome = dispatcher.deliver_action(OsKind::Windows, "OpenSCAD", Action::Render);

        assert!(outcome.is_delivered());
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn test_macos_failure_is_unknown_with_diagnostic() {
        let script = ScriptedBackend::new(
            "applescript",
            Attempt::Failed("Can't get application \"OpenSCAD\". (-1728)".into()),
        );
        let dispatcher = Dispatcher::new().with_candidates(OsKind::MacOs, vec![boxed(&script)]);

        let outcome = dispatcher.deliver_action(OsKind::MacOs, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::Unknown {
                diagnostic: "applescript: Can't get application \"OpenSCAD\". (-1728)".to_string()
            }
        );
    }

    #[test]
    fn test_macos_missing_osascript_is_backend_missing() {
        let runner = FakeRunner::new();
        let clock = ManualClock::new();
        let dispatcher = Dispatcher::from_config(&ScadConfig::default(), &runner, &clock);

        let outcome = dispatcher.deliver_action(OsKind::MacOs, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::BackendMissing {
                tried: vec!["applescript".to_string()],
                last_failure: None,
            }
        );
    }

    #[test]
    fn test_unsupported_os_makes_no_attempts() {
        let script = ScriptedBackend::new("anything", Attempt::Delivered);
        let dispatcher = Dispatcher::new().with_candidates(OsKind::Other, vec![boxed(&script)]);

        let outcome = dispatcher.deliver_action(OsKind::Other, "OpenSCAD", Action::Render);

        assert_eq!(
            outcome,
            Outcome::BackendMissing {
                tried: Vec::new(),
                last_failure: None,
            }
        );
        assert_eq!(script.calls(), 0);
    }

    #[test]
    fn test_every_os_yields_one_outcome() {
        let runner = FakeRunner::new();
        let clock = ManualClock::new();
        let mut config = ScadConfig::default();
        // Keep real input synthesis out of unit tests.
        config.backends.windows = vec![BackendKind::PowerShell];
        config.backends.linux = vec![BackendKind::Xdotool];
        let dispatcher = Dispatcher::from_config(&config, &runner, &clock);

        for &os in OsKind::all() {
            let outcome = dispatcher.deliver_action(os, "OpenSCAD", Action::Render);
            assert!(matches!(outcome, Outcome::BackendMissing { .. }), "{os}: {outcome:?}");
        }
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let runner = FakeRunner::new();
        runner.push_output("xdotool", CommandOutput::failure(1, "no window"));
        runner.push_output("xdotool", CommandOutput::success());
        let clock = ManualClock::new();
        let mut config = ScadConfig::default();
        config.backends.linux = vec![BackendKind::Xdotool];
        let dispatcher = Dispatcher::from_config(&config, &runner, &clock);

        let first = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);
        let second = dispatcher.deliver_action(OsKind::Linux, "OpenSCAD", Action::Render);

        assert!(matches!(
            first,
            Outcome::BackendMissing { last_failure: Some(ref d), .. } if d == "xdotool: no window"
        ));
        assert!(second.is_delivered());
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_from_config_respects_order() {
        let runner = FakeRunner::new();
        let clock = ManualClock::new();
        let dispatcher = Dispatcher::from_config(&ScadConfig::default(), &runner, &clock);

        assert_eq!(dispatcher.candidate_names(OsKind::MacOs), vec!["applescript"]);
        assert_eq!(
            dispatcher.candidate_names(OsKind::Linux),
            vec!["xdotool", "input-simulation"]
        );
        assert_eq!(
            dispatcher.candidate_names(OsKind::Windows),
            vec!["powershell", "input-simulation"]
        );
        assert!(dispatcher.candidate_names(OsKind::Other).is_empty());
    }

    #[test]
    fn test_backend_kind_serializes_as_its_name() {
        let json = serde_json::to_string(&BackendKind::InputSimulation).unwrap();
        assert_eq!(json, "\"input-simulation\"");
        let kind: BackendKind = serde_json::from_str("\"applescript\"").unwrap();
        assert_eq!(kind, BackendKind::AppleScript);
    }
}
