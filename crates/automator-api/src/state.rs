//! Shared handler state.

use std::sync::Arc;
use std::time::Instant;

use automator_protocols::{ControlCommand, ControlHandler, ControlReply};

use crate::error::ApiError;

/// State shared by every route.
#[derive(Clone)]
pub struct ApiState {
    control: Arc<dyn ControlHandler>,
    allowed_origins: Arc<[String]>,
    started_at: Instant,
}

impl ApiState {
    /// State refusing every browser origin.
    pub fn new(control: Arc<dyn ControlHandler>) -> Self {
        Self {
            control,
            allowed_origins: Arc::from(Vec::new()),
            started_at: Instant::now(),
        }
    }

    /// Accept requests from `origins` in addition to non-browser clients.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Arc::from(origins);
        self
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn allows_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed.trim_end_matches('/').eq_ignore_ascii_case(origin))
    }

    /// Seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Hand `command` to the control handler, turning a failed reply into
    /// [`ApiError::Rejected`].
    pub async fn dispatch(&self, command: ControlCommand) -> Result<ControlReply, ApiError> {
        let reply = self.control.handle(command).await;
        if reply.success {
            Ok(reply)
        } else {
            Err(ApiError::Rejected(
                reply.error.unwrap_or_else(|| "Command failed".to_string()),
            ))
        }
    }
}
