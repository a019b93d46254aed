//! DOM capability interface over a single tab.

use async_trait::async_trait;
use automator_protocols::{AspectRatio, Thumbnail};
use serde_json::Value;

use crate::error::PageError;
use crate::upload::UploadFile;

/// Logical page elements the adapter works with.
///
/// Backends map each landmark to concrete selectors; nothing above the
/// backend sees selector strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    FileInput,
    UploadButton,
    ModelSelector,
    /// The video entry of the opened model selector menu.
    VideoModeOption,
    AspectRatioButton(AspectRatio),
    BackButton,
    Video,
    EditPrompt,
    SubmitButton,
    Sidebar,
    Thumbnail,
    /// First thumbnail of the sidebar: the original image.
    ReferenceThumbnail,
    Body,
}

impl Landmark {
    /// Human readable name used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Landmark::FileInput => "file input".to_string(),
            Landmark::UploadButton => "upload button".to_string(),
            Landmark::ModelSelector => "model selector".to_string(),
            Landmark::VideoModeOption => "Video option in menu".to_string(),
            Landmark::AspectRatioButton(r) => format!("aspect ratio button {}", r),
            Landmark::BackButton => "back button".to_string(),
            Landmark::Video => "video element".to_string(),
            Landmark::EditPrompt => "edit prompt".to_string(),
            Landmark::SubmitButton => "submit button".to_string(),
            Landmark::Sidebar => "sidebar".to_string(),
            Landmark::Thumbnail => "thumbnail".to_string(),
            Landmark::ReferenceThumbnail => "reference thumbnail".to_string(),
            Landmark::Body => "page body".to_string(),
        }
    }
}

/// Readiness of a media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaState {
    pub src: String,
    /// HTMLMediaElement.readyState (4 = HAVE_ENOUGH_DATA).
    pub ready_state: u8,
}

impl MediaState {
    /// A source is set and enough data is buffered to play through.
    pub fn is_complete(&self) -> bool {
        !self.src.is_empty() && self.ready_state >= 4
    }
}

/// Capabilities of a tab's document.
///
/// Element operations return `Ok(false)` when the landmark is absent so
/// callers decide whether absence is an error.
#[async_trait]
pub trait Document: Send + Sync {
    /// Current page URL.
    async fn location(&self) -> Result<String, PageError>;

    async fn exists(&self, landmark: Landmark) -> Result<bool, PageError>;

    /// Number of elements matching the landmark.
    async fn count(&self, landmark: Landmark) -> Result<usize, PageError>;

    /// Text content of the landmark, if present.
    async fn text(&self, landmark: Landmark) -> Result<Option<String>, PageError>;

    async fn click(&self, landmark: Landmark) -> Result<bool, PageError>;

    /// Replace an input's value through the native setter and dispatch
    /// `input` and `change` events.
    async fn set_value(&self, landmark: Landmark, value: &str) -> Result<bool, PageError>;

    /// Dispatch the keydown/keypress/keyup sequence for Enter.
    async fn press_enter(&self, landmark: Landmark) -> Result<bool, PageError>;

    /// Set the file list of a file input and dispatch `change`.
    async fn attach_file(&self, landmark: Landmark, file: &UploadFile) -> Result<bool, PageError>;

    async fn media(&self, landmark: Landmark) -> Result<Option<MediaState>, PageError>;

    /// Sidebar thumbnails with a loaded image, in display order.
    async fn thumbnails(&self) -> Result<Vec<Thumbnail>, PageError>;

    /// Fetch `url` with the page's credentials and return it as a data URL.
    async fn fetch_data_url(&self, url: &str) -> Result<String, PageError>;

    /// Free-form structural description for troubleshooting.
    async fn describe(&self) -> Result<Value, PageError>;
}
