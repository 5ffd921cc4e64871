use crate::api::ScadApi;
use crate::clock::SystemClock;
use crate::config::{ScadConfig, CONFIG_FILENAME};
use crate::error::Result;
use crate::model::OsKind;
use crate::process::SystemRunner;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "SCADRUN_CONFIG";

pub struct ScadContext {
    pub api: ScadApi<SystemRunner, SystemClock>,
    pub config_path: Option<PathBuf>,
}

/// Where the config file lives: `$SCADRUN_CONFIG` if set, otherwise
/// `config.json` in the platform config dir.
pub fn config_path() -> Option<PathBuf> {
    config_path_from(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

fn config_path_from(env_override: Option<PathBuf>) -> Option<PathBuf> {
    match env_override {
        Some(path) if !path.as_os_str().is_empty() => Some(path),
        _ => ProjectDirs::from("com", "scadrun", "scadrun")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME)),
    }
}

/// Builds the production API: real processes, real sleeps, detected OS.
pub fn initialize() -> Result<ScadContext> {
    let config_path = config_path();
    let config = match &config_path {
        Some(path) => ScadConfig::load(path)?,
        None => ScadConfig::default(),
    };
    let os = OsKind::detect();
    debug!(config = ?config_path, %os, "initialized");

    Ok(ScadContext {
        api: ScadApi::new(SystemRunner, SystemClock, config, os),
        config_path,
    })
}
