//! Page adapter configuration types (timings, selectors).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of the page adapter's waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Poll cadence while waiting for a view transition.
    #[serde(default = "default_transition_poll")]
    pub transition_poll_ms: u64,

    /// Maximum wait for a view transition.
    #[serde(default = "default_transition_timeout")]
    pub transition_timeout_ms: u64,

    /// Extra wait after a transition is observed.
    #[serde(default = "default_transition_settle")]
    pub transition_settle_ms: u64,

    /// Poll cadence while waiting for a video to become ready.
    #[serde(default = "default_slow_poll")]
    pub video_poll_ms: u64,

    /// Poll cadence while waiting for edit thumbnails.
    #[serde(default = "default_slow_poll")]
    pub thumbnail_poll_ms: u64,

    /// Extra wait once the expected thumbnail count is reached.
    #[serde(default = "default_slow_poll")]
    pub thumbnail_settle_ms: u64,

    /// Wait after opening a menu or clicking a control.
    #[serde(default = "default_menu_settle")]
    pub menu_settle_ms: u64,

    #[serde(default)]
    pub selectors: SelectorsConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            transition_poll_ms: default_transition_poll(),
            transition_timeout_ms: default_transition_timeout(),
            transition_settle_ms: default_transition_settle(),
            video_poll_ms: default_slow_poll(),
            thumbnail_poll_ms: default_slow_poll(),
            thumbnail_settle_ms: default_slow_poll(),
            menu_settle_ms: default_menu_settle(),
            selectors: SelectorsConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn transition_poll(&self) -> Duration {
        Duration::from_millis(self.transition_poll_ms)
    }

    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    pub fn transition_settle(&self) -> Duration {
        Duration::from_millis(self.transition_settle_ms)
    }

    pub fn video_poll(&self) -> Duration {
        Duration::from_millis(self.video_poll_ms)
    }

    pub fn thumbnail_poll(&self) -> Duration {
        Duration::from_millis(self.thumbnail_poll_ms)
    }

    pub fn thumbnail_settle(&self) -> Duration {
        Duration::from_millis(self.thumbnail_settle_ms)
    }

    pub fn menu_settle(&self) -> Duration {
        Duration::from_millis(self.menu_settle_ms)
    }
}

fn default_transition_poll() -> u64 {
    500
}

fn default_transition_timeout() -> u64 {
    10_000
}

fn default_transition_settle() -> u64 {
    1000
}

fn default_slow_poll() -> u64 {
    2000
}

fn default_menu_settle() -> u64 {
    500
}

/// CSS selectors locating the generator's controls.
///
/// List-valued entries are tried in order; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorsConfig {
    #[serde(default = "default_file_input")]
    pub file_input: String,

    #[serde(default = "default_upload_button")]
    pub upload_button: String,

    #[serde(default = "default_model_selector")]
    pub model_selector: String,

    /// Menu entries of the opened model selector.
    #[serde(default = "default_menu_item")]
    pub menu_item: String,

    /// Words that must all appear in the video mode menu entry.
    #[serde(default = "default_video_menu_keywords")]
    pub video_menu_keywords: Vec<String>,

    /// Text shown by the model selector when video mode is active.
    #[serde(default = "default_video_mode_marker")]
    pub video_mode_marker: String,

    /// Aspect ratio button; `{ratio}` is replaced with e.g. `16:9`.
    #[serde(default = "default_aspect_ratio_button")]
    pub aspect_ratio_button: String,

    #[serde(default = "default_back_button")]
    pub back_button: String,

    #[serde(default = "default_video")]
    pub video: String,

    #[serde(default = "default_edit_textarea")]
    pub edit_textarea: Vec<String>,

    #[serde(default = "default_submit_button")]
    pub submit_button: Vec<String>,

    #[serde(default = "default_sidebar")]
    pub sidebar: Vec<String>,

    #[serde(default = "default_thumbnail")]
    pub thumbnail: Vec<String>,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            file_input: default_file_input(),
            upload_button: default_upload_button(),
            model_selector: default_model_selector(),
            menu_item: default_menu_item(),
            video_menu_keywords: default_video_menu_keywords(),
            video_mode_marker: default_video_mode_marker(),
            aspect_ratio_button: default_aspect_ratio_button(),
            back_button: default_back_button(),
            video: default_video(),
            edit_textarea: default_edit_textarea(),
            submit_button: default_submit_button(),
            sidebar: default_sidebar(),
            thumbnail: default_thumbnail(),
        }
    }
}

impl SelectorsConfig {
    /// Selector of the button for `ratio`.
    pub fn aspect_ratio_button_for(&self, ratio: &str) -> String {
        self.aspect_ratio_button.replace("{ratio}", ratio)
    }
}

fn default_file_input() -> String {
    r#"input[name="files"]"#.to_string()
}

fn default_upload_button() -> String {
    r#"button[aria-label="Subir imagen"]"#.to_string()
}

fn default_model_selector() -> String {
    "button#model-select-trigger".to_string()
}

fn default_menu_item() -> String {
    r#"[role="menuitem"]"#.to_string()
}

fn default_video_menu_keywords() -> Vec<String> {
    vec!["Video".to_string(), "Generar".to_string()]
}

fn default_video_mode_marker() -> String {
    "Video".to_string()
}

fn default_aspect_ratio_button() -> String {
    r#"button[aria-label="{ratio}"]"#.to_string()
}

fn default_back_button() -> String {
    r#"button[aria-label="Volver"]"#.to_string()
}

fn default_video() -> String {
    "video#sd-video".to_string()
}

fn default_edit_textarea() -> Vec<String> {
    [
        r#"textarea[aria-label="Escribe para editar la imagen..."]"#,
        r#"textarea[aria-label*="editar"]"#,
        r#"textarea[aria-label*="edit"]"#,
        r#"textarea[placeholder*="editar"]"#,
        r#"textarea[placeholder*="edit"]"#,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_submit_button() -> Vec<String> {
    [
        r#"button[aria-label="Enviar"]"#,
        r#"button[aria-label="Send"]"#,
        r#"button[aria-label="Submit"]"#,
        r#"button[aria-label*="enviar"]"#,
        r#"button[aria-label*="send"]"#,
        r#"button[type="submit"]"#,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sidebar() -> Vec<String> {
    [
        "div.snap-y.snap-mandatory",
        r#"div[class*="snap-y"][class*="snap-mandatory"]"#,
        r#"div.overflow-y-auto[class*="snap"]"#,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_thumbnail() -> Vec<String> {
    ["button.snap-center", r#"button[class*="snap-center"]"#]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
