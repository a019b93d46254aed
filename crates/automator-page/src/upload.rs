//! Upload payload preparation.

use std::path::Path;

use automator_protocols::ImagePayload;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::PageError;

/// An image ready to be placed in a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    /// Base64 encoded contents.
    pub base64: String,
}

impl UploadFile {
    /// Prepare `payload` for upload under `name`.
    pub async fn from_payload(payload: &ImagePayload, name: &str) -> Result<Self, PageError> {
        match payload {
            ImagePayload::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(Self {
                    name: name.to_string(),
                    mime: mime_for_path(path).to_string(),
                    base64: STANDARD.encode(bytes),
                })
            }
            ImagePayload::DataUrl(data) => Self::from_data_url(data, name),
        }
    }

    /// Parse a `data:<mime>;base64,<data>` URL or bare base64 (PNG assumed).
    pub fn from_data_url(data: &str, name: &str) -> Result<Self, PageError> {
        let (mime, encoded) = match data.strip_prefix("data:") {
            Some(rest) => {
                let (header, encoded) = rest
                    .split_once(',')
                    .ok_or_else(|| PageError::InvalidPayload("data URL has no comma".to_string()))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| PageError::InvalidPayload("data URL is not base64".to_string()))?;
                (mime.to_string(), encoded)
            }
            None => ("image/png".to_string(), data),
        };

        if STANDARD.decode(encoded.trim()).is_err() {
            return Err(PageError::InvalidPayload(format!("{} is not valid base64", name)));
        }

        Ok(Self {
            name: name.to_string(),
            mime,
            base64: encoded.trim().to_string(),
        })
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/png",
    }
}
