use serde::{Deserialize, Serialize};
use std::fmt;

/// The operating systems the dispatcher knows how to automate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsKind {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl OsKind {
    /// The OS this binary is running on.
    pub fn detect() -> Self {
        Self::from_os_str(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value onto the closed set.
    pub fn from_os_str(os: &str) -> Self {
        match os {
            "macos" => OsKind::MacOs,
            "windows" => OsKind::Windows,
            "linux" => OsKind::Linux,
            _ => OsKind::Other,
        }
    }

    pub fn all() -> &'static [OsKind] {
        &[OsKind::MacOs, OsKind::Windows, OsKind::Linux, OsKind::Other]
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsKind::MacOs => "macOS",
            OsKind::Windows => "Windows",
            OsKind::Linux => "Linux",
            OsKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A logical request to the CAD application.
///
/// Each backend speaks its own key vocabulary, so the action carries the
/// spelling for every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Trigger the preview render (F6 in OpenSCAD).
    Render,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Render => "render",
        }
    }

    /// Virtual key code for System Events `key code`.
    pub fn mac_key_code(&self) -> u16 {
        match self {
            Action::Render => 97,
        }
    }

    /// X11 keysym name, as understood by xdotool.
    pub fn keysym(&self) -> &'static str {
        match self {
            Action::Render => "F6",
        }
    }

    /// Token for WScript.Shell `SendKeys`.
    pub fn send_keys_token(&self) -> &'static str {
        match self {
            Action::Render => "{F6}",
        }
    }
}

/// Everything a backend needs to know to deliver one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub app_name: String,
    pub action: Action,
}

impl Target {
    pub fn new(app_name: impl Into<String>, action: Action) -> Self {
        Self {
            app_name: app_name.into(),
            action,
        }
    }
}

/// Result of a single `deliver_action` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Delivered { backend: String },
    /// No candidate delivered. `last_failure` holds the diagnostic of the
    /// last backend that was installed but failed, if any.
    BackendMissing {
        tried: Vec<String>,
        last_failure: Option<String>,
    },
    PermissionDenied { guidance: String },
    Unknown { diagnostic: String },
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered { .. })
    }
}
