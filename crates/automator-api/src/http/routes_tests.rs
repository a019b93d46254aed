//! Router tests against a recording control handler.

use std::sync::Arc;

use async_trait::async_trait;
use automator_protocols::{
    ArtifactSummary, AspectRatio, ControlCommand, ControlHandler, ControlReply, ImagePayload,
    JobKind, ReplyData, TabRef,
};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;

/// Records every command and replies through `respond`.
struct RecordingControl {
    commands: Mutex<Vec<ControlCommand>>,
    respond: fn(&ControlCommand) -> ControlReply,
}

impl RecordingControl {
    fn new(respond: fn(&ControlCommand) -> ControlReply) -> Arc<Self> {
        Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            respond,
        })
    }

    fn accepting() -> Arc<Self> {
        Self::new(|_| ControlReply::ok())
    }

    fn commands(&self) -> Vec<ControlCommand> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl ControlHandler for RecordingControl {
    async fn handle(&self, command: ControlCommand) -> ControlReply {
        let reply = (self.respond)(&command);
        self.commands.lock().push(command);
        reply
    }
}

fn app(control: Arc<RecordingControl>) -> Router {
    create_router(ApiState::new(control))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(RecordingControl::accepting())
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_start_media_builds_queue_items() {
    let control = RecordingControl::accepting();
    let body = json!({
        "images": [
            {"path": "/images/cat.png"},
            {"name": "dog.png", "data_url": "data:image/png;base64,AAAA"}
        ],
        "config": {"aspect_ratio": "9:16"},
        "tab": "T1"
    });

    let response = app(control.clone())
        .oneshot(request("POST", "/jobs/media/start", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    match &control.commands()[0] {
        ControlCommand::StartMedia { items, config, tab } => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].source_name, "cat.png");
            assert_eq!(items[0].output_name, "01-grok-cat.mp4");
            assert_eq!(items[1].source_name, "dog.png");
            assert_eq!(
                items[1].payload,
                ImagePayload::DataUrl("data:image/png;base64,AAAA".to_string())
            );
            assert_eq!(config.aspect_ratio, AspectRatio::Portrait9x16);
            assert_eq!(config.output_folder, "grok-videos");
            assert_eq!(tab, &TabRef::new("T1"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[tokio::test]
async fn test_start_edit_defaults_config() {
    let control = RecordingControl::accepting();
    let body = json!({"prompts": ["make it red", "add a hat"], "tab": "T2"});

    let response = app(control.clone())
        .oneshot(request("POST", "/jobs/edit/start", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    match &control.commands()[0] {
        ControlCommand::StartEdit {
            prompts,
            config,
            tab,
        } => {
            assert_eq!(prompts, &vec!["make it red".to_string(), "add a hat".to_string()]);
            assert_eq!(config.delay_secs, 5);
            assert_eq!(tab.as_str(), "T2");
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[tokio::test]
async fn test_start_with_malformed_body_is_bad_request() {
    let control = RecordingControl::accepting();
    let body = json!({"prompts": "not a list", "tab": "T2"});

    let response = app(control.clone())
        .oneshot(request("POST", "/jobs/edit/start", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request:")
    );
    assert!(control.commands().is_empty());
}

#[tokio::test]
async fn test_rejected_command_is_conflict() {
    let control = RecordingControl::new(|command| match command {
        ControlCommand::Pause { kind: JobKind::Edit } => {
            ControlReply::failed("No edit run is in progress")
        }
        _ => ControlReply::ok(),
    });

    let response = app(control.clone())
        .oneshot(request("POST", "/jobs/edit/pause", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No edit run is in progress");
}

#[tokio::test]
async fn test_lifecycle_routes_map_to_commands() {
    let control = RecordingControl::accepting();
    let router = app(control.clone());

    for (method, uri) in [
        ("POST", "/jobs/media/pause"),
        ("POST", "/jobs/media/resume"),
        ("POST", "/jobs/edit/stop"),
        ("GET", "/jobs/edit"),
        ("GET", "/jobs/media/artifacts"),
        ("DELETE", "/jobs/media/artifacts"),
        ("POST", "/jobs/edit/export"),
    ] {
        let response = router
            .clone()
            .oneshot(request(method, uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} {}", method, uri);
    }

    assert_eq!(
        control.commands(),
        vec![
            ControlCommand::Pause { kind: JobKind::Media },
            ControlCommand::Resume { kind: JobKind::Media },
            ControlCommand::Stop { kind: JobKind::Edit },
            ControlCommand::GetState { kind: JobKind::Edit },
            ControlCommand::ListArtifacts { kind: JobKind::Media },
            ControlCommand::ClearArtifacts { kind: JobKind::Media },
            ControlCommand::ExportAll { kind: JobKind::Edit },
        ]
    );
}

#[tokio::test]
async fn test_artifacts_reply_data_is_returned() {
    let control = RecordingControl::new(|_| {
        ControlReply::with_data(ReplyData::Artifacts(vec![ArtifactSummary {
            index: 0,
            filename: "01-grok-cat.mp4".to_string(),
            reference: "https://cdn.example/v.mp4".to_string(),
            origin: Some("cat.png".to_string()),
        }]))
    });

    let response = app(control)
        .oneshot(request("GET", "/jobs/media/artifacts", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["type"], "artifacts");
    assert_eq!(body["data"]["value"][0]["filename"], "01-grok-cat.mp4");
}

#[tokio::test]
async fn test_unknown_kind_is_rejected_before_dispatch() {
    let control = RecordingControl::accepting();

    let response = app(control.clone())
        .oneshot(request("POST", "/jobs/audio/pause", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(control.commands().is_empty());
}

#[tokio::test]
async fn test_update_media_settings() {
    let control = RecordingControl::accepting();
    let body = json!({"aspect_ratio": "1:1"});

    let response = app(control.clone())
        .oneshot(request("PUT", "/jobs/media/settings", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        control.commands(),
        vec![ControlCommand::UpdateSettings {
            aspect_ratio: Some(AspectRatio::Square),
            output_folder: None,
        }]
    );
}

#[tokio::test]
async fn test_edit_settings_are_rejected() {
    let control = RecordingControl::accepting();
    let body = json!({"output_folder": "elsewhere"});

    let response = app(control.clone())
        .oneshot(request("PUT", "/jobs/edit/settings", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(control.commands().is_empty());
}

#[tokio::test]
async fn test_inspect_tab() {
    let control = RecordingControl::new(|_| {
        ControlReply::with_data(ReplyData::Diagnostics(json!({"textareas": 1})))
    });

    let response = app(control.clone())
        .oneshot(request("GET", "/tabs/T9/inspect", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["value"]["textareas"], 1);
    assert_eq!(
        control.commands(),
        vec![ControlCommand::InspectPage {
            tab: TabRef::new("T9")
        }]
    );
}

fn app_with_origins(control: Arc<RecordingControl>, origins: &[&str]) -> Router {
    let origins = origins.iter().map(|o| o.to_string()).collect();
    create_router(ApiState::new(control).with_allowed_origins(origins))
}

fn from_origin(method: &str, uri: &str, origin: &str, body: Option<Value>) -> Request<Body> {
    let mut request = request(method, uri, body);
    request
        .headers_mut()
        .insert("origin", origin.parse().unwrap());
    request
}

#[tokio::test]
async fn test_foreign_origin_is_refused_before_dispatch() {
    let control = RecordingControl::accepting();
    let router = app_with_origins(control.clone(), &["http://localhost:3000"]);

    let response = router
        .clone()
        .oneshot(from_origin(
            "POST",
            "/jobs/media/start",
            "https://evil.example",
            Some(json!({"images": [{"path": "/etc/passwd"}]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Origin not allowed: https://evil.example");

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/jobs/media/start")
        .header("origin", "https://evil.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(control.commands().is_empty());
}

#[tokio::test]
async fn test_browser_origin_is_refused_without_allow_list() {
    let control = RecordingControl::accepting();
    let response = app(control.clone())
        .oneshot(from_origin(
            "POST",
            "/jobs/media/stop",
            "http://localhost:3000",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(control.commands().is_empty());
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers() {
    let control = RecordingControl::accepting();
    let response = app_with_origins(control.clone(), &["http://localhost:3000"])
        .oneshot(from_origin(
            "POST",
            "/jobs/media/stop",
            "http://localhost:3000",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(control.commands().len(), 1);
}
