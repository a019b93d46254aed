//! Progress log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl LogStatus {
    /// Whether the entry has reached a final status.
    pub fn is_final(&self) -> bool {
        matches!(self, LogStatus::Completed | LogStatus::Failed)
    }
}

/// A labelled progress entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub label: String,
    pub status: LogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(label: impl Into<String>, status: LogStatus, error: Option<String>) -> Self {
        Self {
            label: label.into(),
            status,
            error,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered progress log with upsert-by-label semantics.
///
/// Each label appears at most once; updating an existing label replaces its
/// status, error and timestamp but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobLog {
    entries: Vec<LogEntry>,
}

impl JobLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the entry for `label`.
    pub fn upsert(&mut self, label: &str, status: LogStatus, error: Option<String>) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                entry.status = status;
                entry.error = error;
                entry.timestamp = Utc::now();
            }
            None => self.entries.push(LogEntry::new(label, status, error)),
        }
    }

    /// Look up the entry for `label`.
    pub fn get(&self, label: &str) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: LogStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
