//! [`Document`] implementation evaluating scripts in a CDP session.

use std::sync::Arc;

use async_trait::async_trait;
use automator_config::SelectorsConfig;
use automator_page::{Document, Landmark, MediaState, PageError, UploadFile};
use automator_protocols::Thumbnail;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::cdp::ScriptRunner;
use crate::script::Scripts;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaReply {
    src: String,
    ready_state: u8,
}

/// Document of one tab, driven through script evaluation.
pub struct CdpDocument<R: ?Sized = dyn ScriptRunner> {
    runner: Arc<R>,
    scripts: Scripts,
}

impl<R: ScriptRunner + ?Sized> CdpDocument<R> {
    pub fn new(runner: Arc<R>, selectors: SelectorsConfig) -> Self {
        Self {
            runner,
            scripts: Scripts::new(selectors),
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, PageError> {
        let value = self.runner.evaluate(&script).await?;
        trace!("Script result: {}", value);
        serde_json::from_value(value)
            .map_err(|e| PageError::Backend(format!("Unexpected script result: {}", e)))
    }
}

#[async_trait]
impl<R: ScriptRunner + ?Sized> Document for CdpDocument<R> {
    async fn location(&self) -> Result<String, PageError> {
        self.eval(self.scripts.location()).await
    }

    async fn exists(&self, landmark: Landmark) -> Result<bool, PageError> {
        self.eval(self.scripts.exists(landmark)).await
    }

    async fn count(&self, landmark: Landmark) -> Result<usize, PageError> {
        self.eval(self.scripts.count(landmark)).await
    }

    async fn text(&self, landmark: Landmark) -> Result<Option<String>, PageError> {
        self.eval(self.scripts.text(landmark)).await
    }

    async fn click(&self, landmark: Landmark) -> Result<bool, PageError> {
        self.eval(self.scripts.click(landmark)).await
    }

    async fn set_value(&self, landmark: Landmark, value: &str) -> Result<bool, PageError> {
        self.eval(self.scripts.set_value(landmark, value)).await
    }

    async fn press_enter(&self, landmark: Landmark) -> Result<bool, PageError> {
        self.eval(self.scripts.press_enter(landmark)).await
    }

    async fn attach_file(&self, landmark: Landmark, file: &UploadFile) -> Result<bool, PageError> {
        self.eval(
            self.scripts
                .attach_file(landmark, &file.name, &file.mime, &file.base64),
        )
        .await
    }

    async fn media(&self, landmark: Landmark) -> Result<Option<MediaState>, PageError> {
        let reply: Option<MediaReply> = self.eval(self.scripts.media(landmark)).await?;
        Ok(reply.map(|m| MediaState {
            src: m.src,
            ready_state: m.ready_state,
        }))
    }

    async fn thumbnails(&self) -> Result<Vec<Thumbnail>, PageError> {
        self.eval(self.scripts.thumbnails()).await
    }

    async fn fetch_data_url(&self, url: &str) -> Result<String, PageError> {
        let data: String = self.eval(self.scripts.fetch_data_url(url)).await?;
        if !data.starts_with("data:") {
            return Err(PageError::Backend(format!(
                "Fetching {} did not produce a data URL",
                url
            )));
        }
        Ok(data)
    }

    async fn describe(&self) -> Result<Value, PageError> {
        self.eval(self.scripts.describe()).await
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
