//! Infrastructure configuration types (state, export, notify).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{automator_home, default_true};

/// Persisted job state configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Whether media job state is persisted across restarts.
    #[serde(default = "default_true")]
    pub persist: bool,

    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            persist: default_true(),
            dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    automator_home().join("state")
}

/// Artifact export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving the per-job output folders.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,

    /// Pause between consecutive downloads.
    #[serde(default = "default_download_gap")]
    pub download_gap_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            download_gap_ms: default_download_gap(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| automator_home().join("exports"))
}

fn default_download_gap() -> u64 {
    500
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Optional webhook receiving completion notifications as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            webhook_url: None,
        }
    }
}
