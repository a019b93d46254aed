//! Control commands issued by UI surfaces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    ArtifactSummary, AspectRatio, EditRunConfig, JobKind, JobSnapshot, MediaRunConfig, QueueItem,
    TabRef,
};

/// A command from a UI surface to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    StartMedia {
        items: Vec<QueueItem>,
        #[serde(default)]
        config: MediaRunConfig,
        tab: TabRef,
    },
    StartEdit {
        prompts: Vec<String>,
        #[serde(default)]
        config: EditRunConfig,
        tab: TabRef,
    },
    Pause { kind: JobKind },
    Resume { kind: JobKind },
    Stop { kind: JobKind },
    GetState { kind: JobKind },
    ListArtifacts { kind: JobKind },
    ClearArtifacts { kind: JobKind },
    ExportAll { kind: JobKind },
    /// Change persisted media settings.
    UpdateSettings {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aspect_ratio: Option<AspectRatio>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_folder: Option<String>,
    },
    /// Ask the adapter in `tab` for a diagnostic description of the page.
    InspectPage { tab: TabRef },
}

/// Payload of a successful reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReplyData {
    State(Box<JobSnapshot>),
    Artifacts(Vec<ArtifactSummary>),
    Exported { count: usize, folder: String },
    Diagnostics(Value),
}

/// Reply to a control command: a success flag and an optional error string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ReplyData>,
}

impl ControlReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    pub fn with_data(data: ReplyData) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Handles control commands.
#[async_trait]
pub trait ControlHandler: Send + Sync {
    async fn handle(&self, command: ControlCommand) -> ControlReply;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::json!({"command": "pause", "kind": "media"});
        let cmd: ControlCommand = serde_json::from_value(json).unwrap();
        assert_eq!(cmd, ControlCommand::Pause { kind: JobKind::Media });
    }

    #[test]
    fn test_start_edit_defaults_config() {
        let json = serde_json::json!({
            "command": "start_edit",
            "prompts": ["make it red"],
            "tab": "T1"
        });
        let cmd: ControlCommand = serde_json::from_value(json).unwrap();
        match cmd {
            ControlCommand::StartEdit { prompts, config, tab } => {
                assert_eq!(prompts.len(), 1);
                assert_eq!(config.delay_secs, 5);
                assert_eq!(tab.as_str(), "T1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_failed_reply_serialization() {
        let reply = ControlReply::failed("No artifacts to export");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No artifacts to export");
        assert!(json.get("data").is_none());
    }
}
