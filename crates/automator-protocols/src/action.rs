//! Adapter actions and their outputs.
//!
//! An adapter action is a single request to the code driving the target
//! page. Each action yields exactly one [`ActionOutput`] or an error string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AspectRatio, ImagePayload};

/// Requests understood by the page adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageAction {
    /// Connectivity probe.
    Ping,
    /// Describe the current page.
    CheckPage,
    /// Switch the model selector to video generation.
    EnsureVideoMode,
    #[serde(rename_all = "camelCase")]
    SetAspectRatio { ratio: AspectRatio },
    /// Attach an image to the upload input and wait for the generation view.
    #[serde(rename_all = "camelCase")]
    UploadImage { payload: ImagePayload, filename: String },
    #[serde(rename_all = "camelCase")]
    WaitForVideoCompletion { timeout_ms: u64 },
    /// Return from the generation view to the main view.
    GoBack,
    GetVideoUrl,
    CheckEditMode,
    #[serde(rename_all = "camelCase")]
    EnterEditPrompt { prompt: String },
    SubmitEditPrompt,
    /// Focus the reference image so the next prompt edits the original.
    ClickReferenceImage,
    GetEditThumbnails,
    #[serde(rename_all = "camelCase")]
    WaitForEditGeneration { expected_count: usize, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    FetchImageBase64 { url: String },
    /// Diagnostic dump of the edit page structure.
    DebugEditDom,
}

impl PageAction {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            PageAction::Ping => "ping",
            PageAction::CheckPage => "checkPage",
            PageAction::EnsureVideoMode => "ensureVideoMode",
            PageAction::SetAspectRatio { .. } => "setAspectRatio",
            PageAction::UploadImage { .. } => "uploadImage",
            PageAction::WaitForVideoCompletion { .. } => "waitForVideoCompletion",
            PageAction::GoBack => "goBack",
            PageAction::GetVideoUrl => "getVideoUrl",
            PageAction::CheckEditMode => "checkEditMode",
            PageAction::EnterEditPrompt { .. } => "enterEditPrompt",
            PageAction::SubmitEditPrompt => "submitEditPrompt",
            PageAction::ClickReferenceImage => "clickReferenceImage",
            PageAction::GetEditThumbnails => "getEditThumbnails",
            PageAction::WaitForEditGeneration { .. } => "waitForEditGeneration",
            PageAction::FetchImageBase64 { .. } => "fetchImageBase64",
            PageAction::DebugEditDom => "debugEditDom",
        }
    }
}

/// Summary of the page the adapter is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatus {
    pub url: String,
    /// The page is the generator application.
    pub is_target_page: bool,
    pub has_upload_input: bool,
    /// A generation view (with back button) is showing.
    pub on_generation_view: bool,
}

/// A thumbnail in the edit sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    pub index: usize,
}

/// Successful result of an adapter action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionOutput {
    /// The action completed with nothing to report.
    Ack,
    Page(PageStatus),
    /// A finished video URL, when one is present.
    Video(Option<String>),
    EditMode(bool),
    Thumbnails(Vec<Thumbnail>),
    /// The thumbnail count reached when a generation wait finished.
    Generation(usize),
    /// Image contents as a `data:` URL.
    Image(String),
    Diagnostics(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_format() {
        let action = PageAction::WaitForEditGeneration {
            expected_count: 7,
            timeout_ms: 300_000,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "waitForEditGeneration");
        assert_eq!(json["expectedCount"], 7);
        assert_eq!(json["timeoutMs"], 300_000);
        assert_eq!(action.name(), "waitForEditGeneration");
    }

    #[test]
    fn test_unit_action_wire_format() {
        let json = serde_json::to_value(PageAction::Ping).unwrap();
        assert_eq!(json, serde_json::json!({"action": "ping"}));
        let parsed: PageAction = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, PageAction::Ping);
    }

    #[test]
    fn test_output_wire_format() {
        let out = ActionOutput::Video(Some("https://cdn/v.mp4".to_string()));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["data"], "https://cdn/v.mp4");
    }
}
