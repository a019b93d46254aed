//! Queue items and output naming.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Image content handed to the page adapter for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePayload {
    /// An image file on the local disk, read when the upload happens.
    Path(PathBuf),
    /// Inline image: a `data:` URL or bare base64 (assumed PNG).
    DataUrl(String),
}

impl ImagePayload {
    /// Whether the payload can be persisted cheaply and reloaded later.
    pub fn is_file_backed(&self) -> bool {
        matches!(self, ImagePayload::Path(_))
    }
}

/// One image of a media job. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Source identifier, used as the log label.
    pub source_name: String,
    pub payload: ImagePayload,
    /// Desired output filename of the produced video.
    pub output_name: String,
}

impl QueueItem {
    /// Create an item at `index` (0-based) with the default output name.
    pub fn new(index: usize, source_name: impl Into<String>, payload: ImagePayload) -> Self {
        let source_name = source_name.into();
        let output_name = media_output_name(index, &source_name);
        Self {
            source_name,
            payload,
            output_name,
        }
    }

    /// Create an item backed by an image file.
    pub fn from_path(index: usize, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(index, source_name, ImagePayload::Path(path.to_path_buf()))
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`, collapse
/// runs of `_` and trim them from both ends.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Output filename for the video produced from item `index` (0-based).
///
/// `03-grok-sunset.mp4` for the third item named `sunset.png`.
pub fn media_output_name(index: usize, source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(dot) if dot > 0 && !source_name[dot + 1..].contains('/') => &source_name[..dot],
        _ => source_name,
    };
    format!("{:02}-grok-{}.mp4", index + 1, stem)
}

/// Output filename for the edited image produced by prompt `index` (0-based).
pub fn edit_output_name(index: usize, prompt: &str) -> String {
    let head: String = prompt.chars().take(30).collect();
    format!("{:02}-edit-{}.png", index + 1, sanitize_filename(&head))
}

/// Log label for prompt `index` (0-based): the first 40 characters, quoted.
pub fn prompt_label(index: usize, prompt: &str) -> String {
    let head: String = prompt.chars().take(40).collect();
    let ellipsis = if prompt.chars().count() > 40 { "..." } else { "" };
    format!("Prompt {}: \"{}{}\"", index + 1, head, ellipsis)
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
