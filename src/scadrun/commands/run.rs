use super::{CmdMessage, CmdResult};
use crate::automation::Dispatcher;
use crate::clock::Clock;
use crate::config::ScadConfig;
use crate::error::{Result, ScadError};
use crate::model::{Action, OsKind, Outcome};
use crate::process::{CommandSpec, ProcessRunner};
use std::io;
use std::path::Path;

/// Opens `input` in the CAD GUI and, if enabled, asks it to render.
///
/// Only a failed launch is an error. Automation is best effort: whatever the
/// dispatcher reports is turned into messages.
pub fn run<R: ProcessRunner, C: Clock>(
    runner: &R,
    clock: &C,
    config: &ScadConfig,
    os: OsKind,
    input: &Path,
) -> Result<CmdResult> {
    let launch = CommandSpec::new(config.cad_executable.as_str()).arg(input.to_string_lossy());

    runner
        .spawn_detached(&launch)
        .map_err(|e| launch_error(&config.cad_executable, e))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("Launched {}", launch)));

    if !config.auto_render {
        return Ok(result.with_launched(launch));
    }

    clock.sleep(config.delays.launch_settle());

    let dispatcher = Dispatcher::from_config(config, runner, clock);
    let action = Action::Render;
    let outcome = dispatcher.deliver_action(os, &config.app_name, action);

    for message in outcome_messages(&outcome, os, &config.app_name, action) {
        result.add_message(message);
    }

    Ok(result.with_launched(launch).with_outcome(outcome))
}

pub(crate) fn launch_error(program: &str, err: io::Error) -> ScadError {
    if err.kind() == io::ErrorKind::NotFound {
        ScadError::ExecutableNotFound(program.to_string())
    } else {
        ScadError::Io(err)
    }
}

/// User-facing report for an automation outcome.
pub fn outcome_messages(
    outcome: &Outcome,
    os: OsKind,
    app_name: &str,
    action: Action,
) -> Vec<CmdMessage> {
    let key = action.keysym();
    match outcome {
        Outcome::Delivered { backend } => vec![CmdMessage::success(format!(
            "✓ Sent {} to {} (auto-{} via {})",
            key,
            app_name,
            action.label(),
            backend
        ))],
        Outcome::PermissionDenied { guidance } => vec![CmdMessage::warning(format!(
            "Auto-{} failed: {}",
            action.label(),
            guidance
        ))],
        Outcome::BackendMissing {
            tried,
            last_failure,
        } => {
            let mut messages = vec![CmdMessage::warning(format!(
                "Note: could not auto-press {}: no automation backend available on {}",
                key, os
            ))];
            if !tried.is_empty() {
                messages.push(CmdMessage::info(format!("Tried: {}", tried.join(", "))));
            }
            if let Some(failure) = last_failure {
                messages.push(CmdMessage::info(format!("Last error: {}", failure)));
            }
            messages.push(CmdMessage::info(install_hint(os)));
            messages
        }
        Outcome::Unknown { diagnostic } => vec![CmdMessage::warning(format!(
            "Note: could not auto-press {}: {}",
            key, diagnostic
        ))],
    }
}

fn install_hint(os: OsKind) -> &'static str {
    match os {
        OsKind::Linux => "Auto-render needs xdotool or an X11 session. Install with: sudo apt install xdotool",
        OsKind::Windows => "Auto-render needs powershell.exe on PATH or a desktop session for input simulation",
        OsKind::MacOs => "Auto-render needs osascript; check the backends list in the scadrun config",
        OsKind::Other => "Auto-render is not supported on this platform",
    }
}
