//! Produced artifacts.

use serde::{Deserialize, Serialize};

/// A successfully produced output, ready for export. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub filename: String,
    /// Remote `http(s)` URL or inline `data:` URL.
    pub reference: String,
    /// Prompt text or source label the artifact came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reference: reference.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Whether the reference already carries its bytes.
    pub fn is_inline(&self) -> bool {
        self.reference.starts_with("data:")
    }
}

/// Listing view of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub index: usize,
    pub filename: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ArtifactSummary {
    pub fn from_artifact(index: usize, artifact: &Artifact) -> Self {
        Self {
            index,
            filename: artifact.filename.clone(),
            reference: artifact.reference.clone(),
            origin: artifact.origin.clone(),
        }
    }
}
