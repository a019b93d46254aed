//! Notification delivery.

use std::sync::Arc;

use async_trait::async_trait;
use automator_protocols::{Notification, NotifyError, Notifier};
use chrono::Utc;
use tracing::{info, warn};

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            kind = %notification.kind,
            "{}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}

/// Posts notifications as JSON to a webhook.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "kind": notification.kind,
            "title": notification.title,
            "message": notification.message,
            "timestamp": Utc::now().to_rfc3339(),
        });

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(NotifyError::Delivery(format!(
                "Webhook returned {}",
                resp.status()
            ))),
            Err(e) => Err(NotifyError::Delivery(e.to_string())),
        }
    }
}

/// Delivers each notification to every inner notifier.
///
/// Succeeds when at least one notifier delivered.
pub struct FanoutNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut delivered = self.notifiers.is_empty();
        let mut last_error = None;
        for notifier in &self.notifiers {
            match notifier.notify(notification).await {
                Ok(()) => delivered = true,
                Err(e) => {
                    warn!("Notifier failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if !delivered => Err(e),
            _ => Ok(()),
        }
    }
}
