//! API error types.

use automator_protocols::ControlReply;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors returned by API handlers.
///
/// Every variant is rendered as a failed [`ControlReply`] so clients read
/// one response shape regardless of where the request was rejected.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be turned into a command.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The orchestrator refused the command.
    #[error("{0}")]
    Rejected(String),

    /// The request came from a browser origin that is not allowed.
    #[error("Origin not allowed: {0}")]
    ForbiddenOrigin(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(_) => StatusCode::CONFLICT,
            ApiError::ForbiddenOrigin(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ControlReply::failed(self.to_string()))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}
