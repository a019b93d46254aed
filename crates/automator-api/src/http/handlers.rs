//! Control API handlers.
//!
//! Handlers only translate requests into [`ControlCommand`]s; all job
//! semantics live behind the [`ControlHandler`](automator_protocols::ControlHandler).

use std::path::PathBuf;

use automator_protocols::{
    AspectRatio, ControlCommand, ControlReply, EditRunConfig, ImagePayload, JobKind,
    MediaRunConfig, QueueItem, TabRef,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::ApiState;

type ApiResult = Result<Json<ControlReply>, ApiError>;

/// Source of one media image.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// Image file on the orchestrator's disk.
    File { path: PathBuf },
    /// Inline image: a `data:` URL or bare base64.
    Inline { name: String, data_url: String },
}

/// Body of `POST /jobs/media/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartMediaRequest {
    pub images: Vec<ImageSource>,
    #[serde(default)]
    pub config: MediaRunConfig,
    pub tab: TabRef,
}

impl StartMediaRequest {
    pub fn into_command(self) -> ControlCommand {
        let items = self
            .images
            .into_iter()
            .enumerate()
            .map(|(index, source)| match source {
                ImageSource::File { path } => QueueItem::from_path(index, path),
                ImageSource::Inline { name, data_url } => {
                    QueueItem::new(index, name, ImagePayload::DataUrl(data_url))
                }
            })
            .collect();

        ControlCommand::StartMedia {
            items,
            config: self.config,
            tab: self.tab,
        }
    }
}

/// Body of `POST /jobs/edit/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartEditRequest {
    pub prompts: Vec<String>,
    #[serde(default)]
    pub config: EditRunConfig,
    pub tab: TabRef,
}

impl StartEditRequest {
    pub fn into_command(self) -> ControlCommand {
        ControlCommand::StartEdit {
            prompts: self.prompts,
            config: self.config,
            tab: self.tab,
        }
    }
}

/// Body of `PUT /jobs/media/settings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsRequest {
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default)]
    pub output_folder: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(body)?)
}

/// GET /health
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// POST /jobs/{kind}/start
pub async fn start_job(
    State(state): State<ApiState>,
    Path(kind): Path<JobKind>,
    Json(body): Json<Value>,
) -> ApiResult {
    let command = match kind {
        JobKind::Media => parse::<StartMediaRequest>(body)?.into_command(),
        JobKind::Edit => parse::<StartEditRequest>(body)?.into_command(),
    };
    info!("Start requested for {} job", kind);
    state.dispatch(command).await.map(Json)
}

/// POST /jobs/{kind}/pause
pub async fn pause_job(State(state): State<ApiState>, Path(kind): Path<JobKind>) -> ApiResult {
    state.dispatch(ControlCommand::Pause { kind }).await.map(Json)
}

/// POST /jobs/{kind}/resume
pub async fn resume_job(State(state): State<ApiState>, Path(kind): Path<JobKind>) -> ApiResult {
    state.dispatch(ControlCommand::Resume { kind }).await.map(Json)
}

/// POST /jobs/{kind}/stop
pub async fn stop_job(State(state): State<ApiState>, Path(kind): Path<JobKind>) -> ApiResult {
    state.dispatch(ControlCommand::Stop { kind }).await.map(Json)
}

/// GET /jobs/{kind}
pub async fn get_state(State(state): State<ApiState>, Path(kind): Path<JobKind>) -> ApiResult {
    state.dispatch(ControlCommand::GetState { kind }).await.map(Json)
}

/// GET /jobs/{kind}/artifacts
pub async fn list_artifacts(
    State(state): State<ApiState>,
    Path(kind): Path<JobKind>,
) -> ApiResult {
    state
        .dispatch(ControlCommand::ListArtifacts { kind })
        .await
        .map(Json)
}

/// DELETE /jobs/{kind}/artifacts
pub async fn clear_artifacts(
    State(state): State<ApiState>,
    Path(kind): Path<JobKind>,
) -> ApiResult {
    state
        .dispatch(ControlCommand::ClearArtifacts { kind })
        .await
        .map(Json)
}

/// POST /jobs/{kind}/export
pub async fn export_artifacts(
    State(state): State<ApiState>,
    Path(kind): Path<JobKind>,
) -> ApiResult {
    info!("Export requested for {} job", kind);
    state.dispatch(ControlCommand::ExportAll { kind }).await.map(Json)
}

/// PUT /jobs/{kind}/settings
///
/// Only the media job has persisted settings.
pub async fn update_settings(
    State(state): State<ApiState>,
    Path(kind): Path<JobKind>,
    Json(body): Json<Value>,
) -> ApiResult {
    if kind != JobKind::Media {
        return Err(ApiError::InvalidRequest(format!(
            "{} jobs have no persisted settings",
            kind
        )));
    }
    let request: SettingsRequest = parse(body)?;
    state
        .dispatch(ControlCommand::UpdateSettings {
            aspect_ratio: request.aspect_ratio,
            output_folder: request.output_folder,
        })
        .await
        .map(Json)
}

/// GET /tabs/{tab}/inspect
pub async fn inspect_tab(State(state): State<ApiState>, Path(tab): Path<String>) -> ApiResult {
    state
        .dispatch(ControlCommand::InspectPage {
            tab: TabRef::new(tab),
        })
        .await
        .map(Json)
}
