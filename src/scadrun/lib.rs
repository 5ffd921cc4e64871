//! # Scadrun Architecture
//!
//! Scadrun opens an OpenSCAD model in the GUI and presses render for you, or
//! exports it headlessly and hands the result to a slicer. The interesting part
//! is the automation dispatcher; everything else is process plumbing.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints messages, maps errors to exits  │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Validates the input file, dispatches to commands         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - run: launch GUI detached, settle, auto-render            │
//! │  - build: export, then open in slicer                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Automation (automation/) + seams (process.rs, clock.rs)    │
//! │  - Dispatcher walks per-OS backend candidates               │
//! │  - ProcessRunner / Clock traits, faked in tests             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Best Effort
//!
//! Only three things stop a run: a bad input path, a CAD executable that can't
//! be found, and a failed export. Anything that goes wrong while automating
//! the GUI ends up as a warning and the run still succeeds.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: `run` and `build`
//! - [`automation`]: Dispatcher and backends (AppleScript, PowerShell, xdotool, enigo)
//! - [`process`]: External process seam
//! - [`clock`]: Delay seam
//! - [`config`]: JSON configuration
//! - [`model`]: `OsKind`, `Action`, `Target`, `Outcome`
//! - [`init`]: Production wiring
//! - [`error`]: Error types and exit codes

pub mod api;
pub mod automation;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod process;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
