//! Artifact export.

use async_trait::async_trait;

use crate::error::ExportError;
use crate::types::Artifact;

/// Packages artifacts into a named output folder.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Export every artifact into `folder`, returning how many were written.
    async fn export(&self, folder: &str, artifacts: &[Artifact]) -> Result<usize, ExportError>;
}
