//! Persisted media job state.
//!
//! Only control flow survives a restart: configuration, flags, cursor, log
//! and file-backed items. Artifacts and inline image bytes are never stored.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use automator_protocols::{JobLog, JobPhase, MediaRunConfig, QueueItem, TabRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::job::JobState;
use crate::pipeline::MediaWork;

/// File name of the persisted media state.
pub const MEDIA_STATE_FILE: &str = "media-state.json";

/// Durable record of the media job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedMediaState {
    pub config: MediaRunConfig,
    pub phase: JobPhase,
    pub cursor: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<TabRef>,
    #[serde(default)]
    pub log: JobLog,
    /// File-backed items only.
    #[serde(default)]
    pub items: Vec<QueueItem>,
    /// Number of items left out because their payload was inline.
    #[serde(default)]
    pub inline_items: usize,
    pub saved_at: DateTime<Utc>,
}

impl PersistedMediaState {
    /// Capture the durable part of `state`.
    pub fn capture(state: &JobState<MediaWork>) -> Self {
        let (items, inline): (Vec<_>, Vec<_>) = state
            .work
            .items
            .iter()
            .cloned()
            .partition(|item| item.payload.is_file_backed());

        Self {
            config: state.work.config.clone(),
            phase: state.phase,
            cursor: state.cursor,
            tab: state.tab.clone(),
            log: state.log.clone(),
            items,
            inline_items: inline.len(),
            saved_at: Utc::now(),
        }
    }

    /// Whether the interrupted run can continue from its cursor.
    pub fn is_resumable(&self) -> bool {
        self.inline_items == 0
            && self.tab.is_some()
            && self.cursor <= self.items.len()
            && !self.items.is_empty()
    }

    /// Phase to restore after a restart.
    ///
    /// A run that was processing comes back paused when it can be resumed
    /// and stopped otherwise.
    pub fn restored_phase(&self) -> JobPhase {
        match self.phase {
            phase if phase.is_processing() && self.is_resumable() => JobPhase::Paused,
            phase if phase.is_processing() => JobPhase::Stopped,
            phase => phase,
        }
    }

    /// Apply this record to a freshly created job.
    pub fn restore_into(self, state: &mut JobState<MediaWork>) {
        let phase = self.restored_phase();
        state.phase = phase;
        state.cursor = if phase == JobPhase::Stopped { 0 } else { self.cursor };
        state.tab = self.tab;
        state.log = self.log;
        state.work = MediaWork {
            items: self.items,
            config: self.config,
        };
    }
}

/// Storage of the persisted media state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Save the state, replacing any earlier record.
    async fn save(&self, state: &PersistedMediaState) -> Result<(), StoreError>;

    /// Load the last saved state.
    async fn load(&self) -> Result<Option<PersistedMediaState>, StoreError>;

    /// Forget the saved state.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory state store for testing.
pub struct MemoryStateStore {
    state: tokio::sync::RwLock<Option<PersistedMediaState>>,
}

impl MemoryStateStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            state: tokio::sync::RwLock::new(None),
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, state: &PersistedMediaState) -> Result<(), StoreError> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedMediaState>, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.state.write().await = None;
        Ok(())
    }
}

/// File system based state store.
///
/// ```text
/// {state_dir}/
/// └── media-state.json
/// ```
///
/// Saves are serialized, and a record captured before the one already on
/// disk is dropped so a slow writer cannot roll the file back.
pub struct FileStateStore {
    path: PathBuf,
    /// `saved_at` of the record on disk.
    written: tokio::sync::Mutex<Option<DateTime<Utc>>>,
}

impl FileStateStore {
    /// Create a new file-based store under `state_dir`.
    pub async fn new(state_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let state_dir = state_dir.as_ref();
        fs::create_dir_all(state_dir).await?;

        debug!("FileStateStore initialized at {:?}", state_dir);

        Ok(Self {
            path: state_dir.join(MEDIA_STATE_FILE),
            written: tokio::sync::Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn save(&self, state: &PersistedMediaState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;

        let mut written = self.written.lock().await;
        if written.is_some_and(|last| state.saved_at < last) {
            debug!("Skipping stale media state captured at {}", state.saved_at);
            return Ok(());
        }

        // The rename replaces the previous record in one step.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        *written = Some(state.saved_at);
        Ok(())
    }

    async fn load(&self) -> Result<Option<PersistedMediaState>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("Failed to deserialize media state from {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut written = self.written.lock().await;
        *written = None;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
