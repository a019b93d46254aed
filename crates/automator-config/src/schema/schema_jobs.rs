//! Job pipeline configuration types (media, edit).

use std::time::Duration;

use automator_protocols::{AspectRatio, EditRunConfig, MediaRunConfig};
use serde::{Deserialize, Serialize};

/// Media pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Default aspect ratio for new runs.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// Default output folder for exported videos.
    #[serde(default = "default_media_folder")]
    pub output_folder: String,

    /// Maximum wait for one video to finish rendering.
    #[serde(default = "default_generation_timeout")]
    pub completion_timeout_secs: u64,

    /// Settle delay after each setup action.
    #[serde(default = "default_setup_settle")]
    pub setup_settle_ms: u64,

    /// Settle delay after returning to the main view between items.
    #[serde(default = "default_return_settle")]
    pub return_settle_ms: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            output_folder: default_media_folder(),
            completion_timeout_secs: default_generation_timeout(),
            setup_settle_ms: default_setup_settle(),
            return_settle_ms: default_return_settle(),
        }
    }
}

impl MediaConfig {
    /// Per-run settings seeded from this configuration.
    pub fn run_config(&self) -> MediaRunConfig {
        MediaRunConfig {
            aspect_ratio: self.aspect_ratio,
            output_folder: self.output_folder.clone(),
        }
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn setup_settle(&self) -> Duration {
        Duration::from_millis(self.setup_settle_ms)
    }

    pub fn return_settle(&self) -> Duration {
        Duration::from_millis(self.return_settle_ms)
    }
}

fn default_media_folder() -> String {
    "grok-videos".to_string()
}

fn default_generation_timeout() -> u64 {
    300
}

fn default_setup_settle() -> u64 {
    500
}

fn default_return_settle() -> u64 {
    2000
}

/// Edit pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditConfig {
    /// Default delay between prompt submissions.
    #[serde(default = "default_edit_delay")]
    pub delay_secs: u64,

    #[serde(default = "default_edit_folder")]
    pub output_folder: String,

    /// Maximum wait for all generations to appear.
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Images the generator produces per submitted prompt.
    #[serde(default = "default_variants_per_prompt")]
    pub variants_per_prompt: usize,

    /// Settle delay after re-injecting the adapter.
    #[serde(default = "default_setup_settle")]
    pub reinject_settle_ms: u64,

    /// Settle delay after focusing the reference image.
    #[serde(default = "default_setup_settle")]
    pub reference_settle_ms: u64,

    /// Settle delay after entering a prompt.
    #[serde(default = "default_prompt_settle")]
    pub prompt_settle_ms: u64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_edit_delay(),
            output_folder: default_edit_folder(),
            generation_timeout_secs: default_generation_timeout(),
            variants_per_prompt: default_variants_per_prompt(),
            reinject_settle_ms: default_setup_settle(),
            reference_settle_ms: default_setup_settle(),
            prompt_settle_ms: default_prompt_settle(),
        }
    }
}

impl EditConfig {
    /// Per-run settings seeded from this configuration.
    pub fn run_config(&self) -> EditRunConfig {
        EditRunConfig {
            delay_secs: self.delay_secs,
            output_folder: self.output_folder.clone(),
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn reinject_settle(&self) -> Duration {
        Duration::from_millis(self.reinject_settle_ms)
    }

    pub fn reference_settle(&self) -> Duration {
        Duration::from_millis(self.reference_settle_ms)
    }

    pub fn prompt_settle(&self) -> Duration {
        Duration::from_millis(self.prompt_settle_ms)
    }
}

fn default_edit_delay() -> u64 {
    5
}

fn default_edit_folder() -> String {
    "grok-edits".to_string()
}

fn default_variants_per_prompt() -> usize {
    2
}

fn default_prompt_settle() -> u64 {
    200
}
