//! Export and notification errors.

use thiserror::Error;

/// Errors raised while exporting artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export.
    #[error("No artifacts to export")]
    Empty,

    /// Artifact reference could not be interpreted.
    #[error("Invalid artifact reference for {filename}: {reason}")]
    InvalidReference { filename: String, reason: String },

    /// Remote artifact could not be fetched.
    #[error("Failed to fetch {filename}: {reason}")]
    Fetch { filename: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
