use super::{spawn_error_attempt, Attempt, AutomationBackend};
use crate::model::Target;
use crate::process::{CommandSpec, ProcessRunner};

const XDOTOOL: &str = "xdotool";

/// X11 window automation: finds the window by name, activates it and sends
/// the key, all in one xdotool invocation.
pub struct XdotoolBackend<'a, R: ProcessRunner> {
    runner: &'a R,
}

impl<'a, R: ProcessRunner> XdotoolBackend<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    pub fn command(&self, target: &Target) -> CommandSpec {
        CommandSpec::new(XDOTOOL)
            .args(["search", "--name"])
            .arg(target.app_name.as_str())
            .args(["windowactivate", "key"])
            .arg(target.action.keysym())
    }
}

impl<R: ProcessRunner> AutomationBackend for XdotoolBackend<'_, R> {
    fn name(&self) -> &str {
        "xdotool"
    }

    fn attempt(&self, target: &Target) -> Attempt {
        match self.runner.run(&self.command(target)) {
            Ok(output) if output.is_success() => Attempt::Delivered,
            Ok(output) => Attempt::Failed(output.diagnostic()),
            Err(e) => spawn_error_attempt(XDOTOOL, e),
        }
    }
}
