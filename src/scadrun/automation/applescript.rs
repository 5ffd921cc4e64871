use super::{spawn_error_attempt, Attempt, AutomationBackend};
use crate::model::Target;
use crate::process::{CommandSpec, ProcessRunner};
use std::time::Duration;

const OSASCRIPT: &str = "osascript";

/// Error codes osascript reports when UI automation is refused.
/// 1002: "not allowed to send keystrokes", -1719: "not allowed assistive
/// access", -25211: the same from the accessibility API, -1743: "not
/// authorized to send Apple events" (Automation permission).
const PERMISSION_ERROR_CODES: &[&str] = &["1002", "-1719", "-25211", "-1743"];

/// Activates the application through AppleScript and sends the key code via
/// System Events. Requires Accessibility permission for the calling app.
pub struct AppleScriptBackend<'a, R: ProcessRunner> {
    runner: &'a R,
    settle: Duration,
}

impl<'a, R: ProcessRunner> AppleScriptBackend<'a, R> {
    pub fn new(runner: &'a R, settle: Duration) -> Self {
        Self { runner, settle }
    }

    pub fn script(&self, target: &Target) -> String {
        format!(
            "tell application \"{app}\" to activate\n\
             delay {delay}\n\
             tell application \"System Events\" to key code {code}\n",
            app = escape_applescript(&target.app_name),
            delay = format_seconds(self.settle),
            code = target.action.mac_key_code(),
        )
    }
}

impl<R: ProcessRunner> AutomationBackend for AppleScriptBackend<'_, R> {
    fn name(&self) -> &str {
        "applescript"
    }

    fn attempt(&self, target: &Target) -> Attempt {
        let cmd = CommandSpec::new(OSASCRIPT).arg("-e").arg(self.script(target));
        let output = match self.runner.run(&cmd) {
            Ok(output) => output,
            Err(e) => return spawn_error_attempt(OSASCRIPT, e),
        };

        if output.is_success() {
            Attempt::Delivered
        } else if is_permission_error(&output.stderr) {
            Attempt::PermissionDenied(output.diagnostic())
        } else {
            Attempt::Failed(output.diagnostic())
        }
    }
}

fn is_permission_error(stderr: &str) -> bool {
    PERMISSION_ERROR_CODES
        .iter()
        .any(|code| stderr.contains(&format!("({})", code)))
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// AppleScript `delay` takes fractional seconds.
fn format_seconds(d: Duration) -> String {
    let millis = d.as_millis();
    format!("{}.{:03}", millis / 1000, millis % 1000)
}
