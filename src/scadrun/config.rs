use crate::automation::BackendKind;
use crate::error::{Result, ScadError};
use crate::model::OsKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_CAD_EXECUTABLE: &str = "openscad";
const DEFAULT_APP_NAME: &str = "OpenSCAD";
const DEFAULT_EXPORT_EXT: &str = "3mf";

/// Configuration for scadrun, stored as JSON in the user config dir.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScadConfig {
    /// CAD executable used for both the GUI and headless export
    #[serde(default = "default_cad_executable")]
    pub cad_executable: String,

    /// Window/application name used to find the CAD window
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Extension of the exported file (without the dot)
    #[serde(default = "default_export_ext")]
    pub export_extension: String,

    /// Send the render key after launching the GUI
    #[serde(default = "default_true")]
    pub auto_render: bool,

    /// Open the exported file in the slicer after a build
    #[serde(default = "default_true")]
    pub open_slicer: bool,

    #[serde(default)]
    pub delays: DelayConfig,

    #[serde(default)]
    pub backends: BackendOrder,

    #[serde(default)]
    pub slicer: SlicerConfig,
}

fn default_cad_executable() -> String {
    DEFAULT_CAD_EXECUTABLE.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_export_ext() -> String {
    DEFAULT_EXPORT_EXT.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ScadConfig {
    fn default() -> Self {
        Self {
            cad_executable: default_cad_executable(),
            app_name: default_app_name(),
            export_extension: default_export_ext(),
            auto_render: true,
            open_slicer: true,
            delays: DelayConfig::default(),
            backends: BackendOrder::default(),
            slicer: SlicerConfig::default(),
        }
    }
}

/// Settle delays, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DelayConfig {
    /// Wait between launching the GUI and attempting automation
    pub launch_settle_ms: u64,
    /// Wait between activating the window and sending the key
    pub activate_settle_ms: u64,
    /// Wait before raw input simulation, which cannot activate a window
    pub input_settle_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            launch_settle_ms: 500,
            activate_settle_ms: 500,
            input_settle_ms: 500,
        }
    }
}

impl DelayConfig {
    pub fn launch_settle(&self) -> Duration {
        Duration::from_millis(self.launch_settle_ms)
    }

    pub fn activate_settle(&self) -> Duration {
        Duration::from_millis(self.activate_settle_ms)
    }

    pub fn input_settle(&self) -> Duration {
        Duration::from_millis(self.input_settle_ms)
    }
}

/// Ordered automation backend candidates per OS. First success wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendOrder {
    pub macos: Vec<BackendKind>,
    pub windows: Vec<BackendKind>,
    pub linux: Vec<BackendKind>,
}

impl Default for BackendOrder {
    fn default() -> Self {
        Self {
            macos: vec![BackendKind::AppleScript],
            windows: vec![BackendKind::PowerShell, BackendKind::InputSimulation],
            linux: vec![BackendKind::Xdotool, BackendKind::InputSimulation],
        }
    }
}

impl BackendOrder {
    /// Candidates for an OS. Unsupported systems never get any.
    pub fn for_os(&self, os: OsKind) -> &[BackendKind] {
        match os {
            OsKind::MacOs => &self.macos,
            OsKind::Windows => &self.windows,
            OsKind::Linux => &self.linux,
            OsKind::Other => &[],
        }
    }
}

/// How to reach the slicer on each platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlicerConfig {
    /// Application name passed to `open -a` on macOS
    pub macos_app: String,
    /// Executable passed to `start` on Windows
    pub windows_exe: String,
    /// Executable on PATH elsewhere
    pub linux_exe: String,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            macos_app: "OrcaSlicer".to_string(),
            windows_exe: "OrcaSlicer.exe".to_string(),
            linux_exe: "orca-slicer".to_string(),
        }
    }
}

impl ScadConfig {
    /// Load config from the given file, or return defaults if it doesn't exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(ScadError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| ScadError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Export extension without a leading dot
    pub fn export_ext(&self) -> &str {
        self.export_extension.trim_start_matches('.')
    }
}
