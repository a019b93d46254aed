//! Folder exporter: writes artifacts as files into an output folder.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use automator_protocols::{Artifact, ExportError, Exporter};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

/// Exports artifacts below a root directory.
///
/// Remote references are downloaded, `data:` references decoded. Individual
/// failures are logged and skipped; the export fails only when nothing
/// could be written.
pub struct FolderExporter {
    root: PathBuf,
    gap: Duration,
    client: reqwest::Client,
}

impl FolderExporter {
    /// Create a new exporter writing below `root`, pausing `gap` between files.
    pub fn new(root: impl Into<PathBuf>, gap: Duration) -> Self {
        Self {
            root: root.into(),
            gap,
            client: reqwest::Client::new(),
        }
    }

    /// Directory for `folder`, confined to the export root.
    pub fn folder_path(&self, folder: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in Path::new(folder).components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }

    async fn fetch(&self, artifact: &Artifact) -> Result<Vec<u8>, ExportError> {
        if artifact.is_inline() {
            return decode_data_url(&artifact.filename, &artifact.reference);
        }

        let url = Url::parse(&artifact.reference).map_err(|e| ExportError::InvalidReference {
            filename: artifact.filename.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExportError::InvalidReference {
                filename: artifact.filename.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let fetch_error = |reason: String| ExportError::Fetch {
            filename: artifact.filename.clone(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Decode the payload of a `data:` URL.
fn decode_data_url(filename: &str, reference: &str) -> Result<Vec<u8>, ExportError> {
    let invalid = |reason: &str| ExportError::InvalidReference {
        filename: filename.to_string(),
        reason: reason.to_string(),
    };

    let rest = reference
        .strip_prefix("data:")
        .ok_or_else(|| invalid("not a data URL"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing ','"))?;

    if header.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| invalid(&e.to_string()))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[async_trait]
impl Exporter for FolderExporter {
    async fn export(&self, folder: &str, artifacts: &[Artifact]) -> Result<usize, ExportError> {
        if artifacts.is_empty() {
            return Err(ExportError::Empty);
        }

        let dir = self.folder_path(folder);
        fs::create_dir_all(&dir).await?;

        let mut written = 0;
        let mut last_error = None;
        for (i, artifact) in artifacts.iter().enumerate() {
            if i > 0 && !self.gap.is_zero() {
                tokio::time::sleep(self.gap).await;
            }

            let name = Path::new(&artifact.filename)
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| format!("artifact-{:02}", i + 1).into());
            match self.fetch(artifact).await {
                Ok(bytes) => {
                    fs::write(dir.join(&name), bytes).await?;
                    debug!("Exported {}", artifact.filename);
                    written += 1;
                }
                Err(e) => {
                    warn!("Failed to export {}: {}", artifact.filename, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if written == 0 => Err(e),
            _ => {
                info!("Exported {} of {} artifacts to {:?}", written, artifacts.len(), dir);
                Ok(written)
            }
        }
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
