use super::{spawn_error_attempt, Attempt, AutomationBackend};
use crate::model::Target;
use crate::process::{CommandSpec, ProcessRunner};
use std::time::Duration;

const POWERSHELL: &str = "powershell";

/// Exit code the script uses when no window matches the application name.
const EXIT_NO_WINDOW: i32 = 3;

/// Windows window automation through the WScript.Shell COM object:
/// `AppActivate` brings the window forward, `SendKeys` types into it.
pub struct PowerShellBackend<'a, R: ProcessRunner> {
    runner: &'a R,
    settle: Duration,
}

impl<'a, R: ProcessRunner> PowerShellBackend<'a, R> {
    pub fn new(runner: &'a R, settle: Duration) -> Self {
        Self { runner, settle }
    }

    pub fn script(&self, target: &Target) -> String {
        format!(
            "$shell = New-Object -ComObject WScript.Shell; \
             if (-not $shell.AppActivate('{app}')) {{ exit {no_window} }}; \
             Start-Sleep -Milliseconds {settle}; \
             $shell.SendKeys('{keys}')",
            app = escape_single_quoted(&target.app_name),
            no_window = EXIT_NO_WINDOW,
            settle = self.settle.as_millis(),
            keys = target.action.send_keys_token(),
        )
    }
}

impl<R: ProcessRunner> AutomationBackend for PowerShellBackend<'_, R> {
    fn name(&self) -> &str {
        "powershell"
    }

    fn attempt(&self, target: &Target) -> Attempt {
        let cmd = CommandSpec::new(POWERSHELL)
            .args(["-NoProfile", "-NonInteractive", "-Command"])
            .arg(self.script(target));
        let output = match self.runner.run(&cmd) {
            Ok(output) => output,
            Err(e) => return spawn_error_attempt(POWERSHELL, e),
        };

        match output.code {
            Some(0) => Attempt::Delivered,
            Some(EXIT_NO_WINDOW) => {
                Attempt::Failed(format!("no window matching '{}'", target.app_name))
            }
            _ => Attempt::Failed(output.diagnostic()),
        }
    }
}

/// Single-quoted PowerShell strings escape `'` by doubling it.
fn escape_single_quoted(s: &str) -> String {
    s.replace('\'', "''")
}
