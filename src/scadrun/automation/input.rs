use super::{Attempt, AutomationBackend};
use crate::clock::Clock;
use crate::model::{Action, Target};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::time::Duration;
use tracing::warn;

/// An open connection to the platform input system.
pub trait KeyClicker {
    fn click(&mut self, key: Key) -> Result<(), String>;
}

/// Opens connections to the platform input system.
pub trait InputSystem {
    fn connect(&self) -> Result<Box<dyn KeyClicker>, String>;
}

/// The real input system, through `enigo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnigoInput;

impl InputSystem for EnigoInput {
    fn connect(&self) -> Result<Box<dyn KeyClicker>, String> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| e.to_string())?;
        Ok(Box::new(enigo))
    }
}

impl KeyClicker for Enigo {
    fn click(&mut self, key: Key) -> Result<(), String> {
        self.key(key, Direction::Click).map_err(|e| e.to_string())
    }
}

/// Synthesizes the key in-process.
///
/// There is no window activation here: after the settle delay the key goes to
/// whichever window has focus. That is usually the freshly launched CAD
/// window, but not always.
pub struct InputSimulationBackend<'a, C: Clock, I: InputSystem = EnigoInput> {
    clock: &'a C,
    settle: Duration,
    input: I,
}

impl<'a, C: Clock> InputSimulationBackend<'a, C, EnigoInput> {
    pub fn new(clock: &'a C, settle: Duration) -> Self {
        Self::with_input(clock, settle, EnigoInput)
    }
}

impl<'a, C: Clock, I: InputSystem> InputSimulationBackend<'a, C, I> {
    pub fn with_input(clock: &'a C, settle: Duration, input: I) -> Self {
        Self {
            clock,
            settle,
            input,
        }
    }
}

impl<C: Clock, I: InputSystem> AutomationBackend for InputSimulationBackend<'_, C, I> {
    fn name(&self) -> &str {
        "input-simulation"
    }

    fn attempt(&self, target: &Target) -> Attempt {
        let mut clicker = match self.input.connect() {
            Ok(clicker) => clicker,
            Err(e) => return Attempt::NotInstalled(format!("no input connection: {}", e)),
        };

        self.clock.sleep(self.settle);
        warn!(
            app = %target.app_name,
            "input simulation cannot focus windows; key goes to the focused window"
        );

        match clicker.click(key_for(target.action)) {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}

fn key_for(action: Action) -> Key {
    match action {
        Action::Render => Key::F6,
    }
}
