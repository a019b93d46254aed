//! Job kinds, phases and state snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::log::LogEntry;
use super::settings::{EditRunConfig, MediaRunConfig};

/// The two independent job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Image-to-video generation.
    Media,
    /// Prompt-driven image edits.
    Edit,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Media => "media",
            JobKind::Edit => "edit",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of a job.
///
/// `Idle -> Running -> {Paused, Completed, Stopped, Aborted}`,
/// `Paused -> {Running, Stopped}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
    /// Terminated because a precondition failed.
    Aborted,
}

impl JobPhase {
    /// The `processing` flag: a run exists and has not terminated.
    pub fn is_processing(&self) -> bool {
        matches!(self, JobPhase::Running | JobPhase::Paused)
    }

    /// The `paused` flag. Implies [`is_processing`](Self::is_processing).
    pub fn is_paused(&self) -> bool {
        matches!(self, JobPhase::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Stopped | JobPhase::Aborted)
    }
}

/// Settings carried in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSettings {
    Media(MediaRunConfig),
    Edit(EditRunConfig),
}

/// Read-only view of a job for UI surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub kind: JobKind,
    pub phase: JobPhase,
    pub processing: bool,
    pub paused: bool,
    pub cursor: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_label: Option<String>,
    pub log: Vec<LogEntry>,
    pub settings: JobSettings,
    pub artifact_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
