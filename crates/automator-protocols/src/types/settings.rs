//! Per-run settings and tab references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Aspect ratios offered by the video generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[default]
    #[serde(rename = "16:9")]
    Landscape16x9,
}

impl AspectRatio {
    /// All supported ratios.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Square,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid aspect ratio: {}", s))
    }
}

/// Settings for a media run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRunConfig {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    #[serde(default = "default_media_folder")]
    pub output_folder: String,
}

impl Default for MediaRunConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            output_folder: default_media_folder(),
        }
    }
}

fn default_media_folder() -> String {
    "grok-videos".to_string()
}

/// Settings for an edit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRunConfig {
    /// Delay between prompt submissions, in seconds.
    #[serde(default = "default_edit_delay")]
    pub delay_secs: u64,

    #[serde(default = "default_edit_folder")]
    pub output_folder: String,
}

impl Default for EditRunConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_edit_delay(),
            output_folder: default_edit_folder(),
        }
    }
}

fn default_edit_delay() -> u64 {
    5
}

fn default_edit_folder() -> String {
    "grok-edits".to_string()
}

/// Reference to a browser tab (a DevTools target id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabRef(pub String);

impl TabRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
