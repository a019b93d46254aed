//! Queue errors.

use automator_protocols::{ChannelError, ExportError, JobKind};
use thiserror::Error;

/// Errors returned by control operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A run of this kind is already running or paused.
    #[error("A {0} run is already in progress")]
    AlreadyRunning(JobKind),

    /// The command needs a running or paused run.
    #[error("No {0} run is in progress")]
    NotProcessing(JobKind),

    #[error("Nothing to process: the {0} queue is empty")]
    EmptyQueue(JobKind),

    #[error("No target tab for the {0} run")]
    NoTab(JobKind),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from persisted state storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
