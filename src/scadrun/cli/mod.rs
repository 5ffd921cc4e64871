//! # CLI Layer
//!
//! This module is **one possible UI client** for scadrun.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: `run()`, context wiring and dispatch
//! - `print.rs`: colored message output

mod commands;
mod print;
mod setup;

pub use commands::run;
