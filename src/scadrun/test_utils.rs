//! Test doubles for the process, clock, input and backend seams.
//!
//! Everything here uses `RefCell`/`Cell` for interior mutability since
//! scadrun is single-threaded and the traits take `&self`.

use crate::automation::input::{InputSystem, KeyClicker};
use crate::automation::{Attempt, AutomationBackend};
use crate::clock::Clock;
use crate::model::Target;
use crate::process::{CommandOutput, CommandSpec, ProcessRunner};
use enigo::Key;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub detached: bool,
}

enum Scripted {
    Output(CommandOutput),
    Error(io::ErrorKind),
}

/// Process runner that answers from a script instead of the OS.
///
/// Programs without a scripted answer behave as if they were not installed.
#[derive(Default)]
pub struct FakeRunner {
    responses: RefCell<HashMap<String, VecDeque<Scripted>>>,
    spawnable: RefCell<HashSet<String>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output of the next `run` of `program`.
    pub fn push_output(&self, program: &str, output: CommandOutput) {
        self.responses
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(Scripted::Output(output));
    }

    /// Queue an error for the next `run` of `program`.
    pub fn push_error(&self, program: &str, kind: io::ErrorKind) {
        self.responses
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(Scripted::Error(kind));
    }

    /// Let `spawn_detached` succeed for `program`.
    pub fn allow_spawn(&self, program: &str) {
        self.spawnable.borrow_mut().insert(program.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }

    fn record(&self, cmd: &CommandSpec, detached: bool) {
        self.calls.borrow_mut().push(RecordedCall {
            program: cmd.program.clone(),
            args: cmd.args.clone(),
            detached,
        });
    }
}

fn not_found(program: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", program))
}

impl ProcessRunner for FakeRunner {
    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()> {
        self.record(cmd, true);
        if self.spawnable.borrow().contains(&cmd.program) {
            Ok(())
        } else {
            Err(not_found(&cmd.program))
        }
    }

    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        self.record(cmd, false);
        let next = self
            .responses
            .borrow_mut()
            .get_mut(&cmd.program)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Error(kind)) => Err(io::Error::new(kind, "scripted failure")),
            None => Err(not_found(&cmd.program)),
        }
    }
}

/// Clock that records requested sleeps and returns immediately.
#[derive(Default)]
pub struct ManualClock {
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Input system that records clicked keys instead of synthesizing them.
///
/// Clones share the recorded clicks, so a test can keep one handle and give
/// the other to the backend.
#[derive(Clone, Default)]
pub struct FakeInput {
    connect_error: Option<String>,
    click_error: Option<String>,
    clicks: Rc<RefCell<Vec<Key>>>,
}

impl FakeInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An input system that cannot be reached.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            connect_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Connects, but refuses every click.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            click_error: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn clicks(&self) -> Vec<Key> {
        self.clicks.borrow().clone()
    }
}

struct FakeClicker {
    error: Option<String>,
    clicks: Rc<RefCell<Vec<Key>>>,
}

impl KeyClicker for FakeClicker {
    fn click(&mut self, key: Key) -> Result<(), String> {
        match &self.error {
            Some(reason) => Err(reason.clone()),
            None => {
                self.clicks.borrow_mut().push(key);
                Ok(())
            }
        }
    }
}

impl InputSystem for FakeInput {
    fn connect(&self) -> Result<Box<dyn KeyClicker>, String> {
        if let Some(reason) = &self.connect_error {
            return Err(reason.clone());
        }
        Ok(Box::new(FakeClicker {
            error: self.click_error.clone(),
            clicks: Rc::clone(&self.clicks),
        }))
    }
}

/// Backend that always answers with the same attempt and counts its calls.
pub struct ScriptedBackend {
    name: String,
    answer: Attempt,
    calls: Cell<usize>,
    log: Option<Rc<RefCell<Vec<String>>>>,
}

impl ScriptedBackend {
    pub fn new(name: &str, answer: Attempt) -> Self {
        Self {
            name: name.to_string(),
            answer,
            calls: Cell::new(0),
            log: None,
        }
    }

    /// A log shared between backends, to check the order they ran in.
    pub fn shared_log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    pub fn with_log(mut self, log: &Rc<RefCell<Vec<String>>>) -> Self {
        self.log = Some(Rc::clone(log));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl AutomationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, _target: &Target) -> Attempt {
        self.calls.set(self.calls.get() + 1);
        if let Some(log) = &self.log {
            log.borrow_mut().push(self.name.clone());
        }
        self.answer.clone()
    }
}
