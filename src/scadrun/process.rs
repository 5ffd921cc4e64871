//! # External Processes
//!
//! Every program scadrun talks to (the CAD application, the exporter, the
//! slicer, osascript, powershell, xdotool) is invoked through the
//! [`ProcessRunner`] trait. There are exactly two ways to invoke something:
//!
//! - [`ProcessRunner::spawn_detached`]: fire and forget. Used for the CAD GUI,
//!   whose lifetime is not ours to manage.
//! - [`ProcessRunner::run`]: run to completion and capture the output. Used
//!   whenever the exit status feeds the next step.
//!
//! A program that cannot be found surfaces as `io::ErrorKind::NotFound`, which
//! callers translate into "not installed".

use std::fmt;
use std::io;
use std::process::{Command, Stdio};
use tracing::debug;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a process run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best available diagnostic text: stderr, then stdout, then the status.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Abstract interface for launching external programs.
pub trait ProcessRunner {
    /// Start a program without waiting for it to exit.
    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()>;

    /// Run a program to completion, capturing stdout and stderr.
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()> {
        (**self).spawn_detached(cmd)
    }

    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        (**self).run(cmd)
    }
}

/// Runs programs with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()> {
        debug!(command = %cmd, "spawning detached");
        // The child handle is dropped on purpose: the GUI outlives us.
        Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }

    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        debug!(command = %cmd, "running");
        let output = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()?;
        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %cmd, code = ?result.code, "finished");
        Ok(result)
    }
}
