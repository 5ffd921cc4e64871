use std::path::PathBuf;
use thiserror::Error;

/// Exit codes returned by the binary.
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_EXECUTABLE_NOT_FOUND: i32 = 3;
pub const EXIT_EXPORT_FAILED: i32 = 4;

#[derive(Error, Debug)]
pub enum ScadError {
    #[error("{0}")]
    Usage(String),

    #[error("'{0}' not found in PATH. Please install OpenSCAD or set cad_executable in the config.")]
    ExecutableNotFound(String),

    #[error("Export to {path} failed: {stderr}")]
    ExportFailed { path: PathBuf, stderr: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScadError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScadError::Usage(_) => EXIT_USAGE,
            ScadError::ExecutableNotFound(_) => EXIT_EXECUTABLE_NOT_FOUND,
            ScadError::ExportFailed { .. } => EXIT_EXPORT_FAILED,
            ScadError::Config(_) | ScadError::Io(_) => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScadError>;
