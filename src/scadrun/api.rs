//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for scadrun operations, whatever the UI.
//!
//! The facade:
//! - **Normalizes inputs**: the model file must exist before anything runs
//! - **Dispatches** to `commands::run` or `commands::build`
//! - **Returns structured types** (`Result<CmdResult>`), never prints
//!
//! ## Generic Over Runner and Clock
//!
//! `ScadApi<R: ProcessRunner, C: Clock>`:
//! - Production: `ScadApi<SystemRunner, SystemClock>`
//! - Testing: `ScadApi<FakeRunner, ManualClock>`
//!
//! so the whole launch/automate/export sequence can be exercised without
//! spawning a process or sleeping.

use crate::clock::Clock;
use crate::commands::{self, CmdResult};
use crate::config::ScadConfig;
use crate::error::{Result, ScadError};
use crate::model::OsKind;
use crate::process::ProcessRunner;
use std::path::Path;
use tracing::debug;

pub struct ScadApi<R: ProcessRunner, C: Clock> {
    runner: R,
    clock: C,
    config: ScadConfig,
    os: OsKind,
}

impl<R: ProcessRunner, C: Clock> ScadApi<R, C> {
    pub fn new(runner: R, clock: C, config: ScadConfig, os: OsKind) -> Self {
        Self {
            runner,
            clock,
            config,
            os,
        }
    }

    /// Open the model in the CAD GUI and trigger a render.
    pub fn run_file(&self, path: &Path) -> Result<CmdResult> {
        check_input(path)?;
        debug!(file = %path.display(), os = %self.os, "run");
        commands::run::run(&self.runner, &self.clock, &self.config, self.os, path)
    }

    /// Export the model and open the result in the slicer.
    pub fn build_file(&self, path: &Path) -> Result<CmdResult> {
        check_input(path)?;
        debug!(file = %path.display(), os = %self.os, "build");
        commands::build::run(&self.runner, &self.config, self.os, path)
    }
}

fn check_input(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ScadError::Usage(
            "Usage: scadrun <file.scad> [--build]".to_string(),
        ));
    }
    if !path.is_file() {
        return Err(ScadError::Usage(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(())
}
