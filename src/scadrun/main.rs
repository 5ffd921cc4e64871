//! # Scadrun CLI
//!
//! The binary is intentionally thin: argument parsing, logging setup and output
//! live in `cli/`, this file only invokes `cli::run()` and turns errors into
//! exit codes.
//!
//! ```text
//! scadrun model.scad           # open in OpenSCAD, press F6
//! scadrun model.scad --build   # export model.3mf, open in OrcaSlicer
//! ```
//!
//! Exit codes: 0 success (automation trouble included), 2 usage error,
//! 3 OpenSCAD not found, 4 export failed, 1 anything else.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
