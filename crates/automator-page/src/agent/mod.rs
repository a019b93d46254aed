//! Page agent: executes adapter actions against a [`Document`].

mod edit;
mod media;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use automator_config::PageConfig;
use automator_protocols::{ActionOutput, PageAction, PageStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::document::{Document, Landmark};
use crate::error::{PageError, PollError};
use crate::poll::{PollSpec, poll_until};

/// Handles adapter actions, reporting failures as plain messages.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, action: PageAction) -> Result<ActionOutput, String>;

    /// Called once the adapter has been replaced or disconnected.
    /// In-flight waits should end promptly.
    fn shutdown(&self) {}
}

/// Delays and poll cadences used by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTimings {
    /// Wait for the main/generation view to appear.
    pub transition: PollSpec,
    pub transition_settle: Duration,
    pub video_poll: Duration,
    pub thumbnail_poll: Duration,
    pub thumbnail_settle: Duration,
    /// After opening a menu or submitting.
    pub control_settle: Duration,
    /// After clicking an option inside an open menu.
    pub option_settle: Duration,
    /// After dismissing a menu.
    pub dismiss_settle: Duration,
    /// Between clearing an input and typing into it.
    pub clear_settle: Duration,
    /// After typing into an input.
    pub input_settle: Duration,
}

impl AgentTimings {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            transition: PollSpec::new(config.transition_poll(), config.transition_timeout()),
            transition_settle: config.transition_settle(),
            video_poll: config.video_poll(),
            thumbnail_poll: config.thumbnail_poll(),
            thumbnail_settle: config.thumbnail_settle(),
            control_settle: config.menu_settle(),
            ..Self::default()
        }
    }
}

impl Default for AgentTimings {
    fn default() -> Self {
        Self {
            transition: PollSpec::new(Duration::from_millis(500), Duration::from_secs(10)),
            transition_settle: Duration::from_secs(1),
            video_poll: Duration::from_secs(2),
            thumbnail_poll: Duration::from_secs(2),
            thumbnail_settle: Duration::from_secs(2),
            control_settle: Duration::from_millis(500),
            option_settle: Duration::from_millis(300),
            dismiss_settle: Duration::from_millis(200),
            clear_settle: Duration::from_millis(50),
            input_settle: Duration::from_millis(200),
        }
    }
}

/// Executes adapter actions on one tab.
pub struct PageAgent<D> {
    document: D,
    clock: Arc<dyn Clock>,
    timings: AgentTimings,
    page_url_pattern: String,
    video_mode_marker: String,
    cancel: CancellationToken,
}

impl<D: Document> PageAgent<D> {
    /// Create a new agent over `document`.
    pub fn new(document: D, clock: Arc<dyn Clock>) -> Self {
        Self {
            document,
            clock,
            timings: AgentTimings::default(),
            page_url_pattern: "grok.com/imagine".to_string(),
            video_mode_marker: "Video".to_string(),
            cancel: CancellationToken::new(),
        }
    }

    /// Apply timings and page markers from configuration.
    pub fn with_config(mut self, config: &PageConfig, page_url_pattern: &str) -> Self {
        self.timings = AgentTimings::from_config(config);
        self.page_url_pattern = page_url_pattern.to_string();
        self.video_mode_marker = config.selectors.video_mode_marker.clone();
        self
    }

    pub fn with_timings(mut self, timings: AgentTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Execute one action.
    pub async fn execute(&self, action: PageAction) -> Result<ActionOutput, PageError> {
        match action {
            PageAction::Ping => Ok(ActionOutput::Ack),
            PageAction::CheckPage => self.check_page().await.map(ActionOutput::Page),
            PageAction::EnsureVideoMode => self.ensure_video_mode().await.map(|_| ActionOutput::Ack),
            PageAction::SetAspectRatio { ratio } => {
                self.set_aspect_ratio(ratio).await.map(|_| ActionOutput::Ack)
            }
            PageAction::UploadImage { payload, filename } => self
                .upload_image(&payload, &filename)
                .await
                .map(|_| ActionOutput::Ack),
            PageAction::WaitForVideoCompletion { timeout_ms } => self
                .wait_for_video_completion(Duration::from_millis(timeout_ms))
                .await
                .map(|url| ActionOutput::Video(Some(url))),
            PageAction::GoBack => self.go_back().await.map(|_| ActionOutput::Ack),
            PageAction::GetVideoUrl => self.video_url().await.map(ActionOutput::Video),
            PageAction::CheckEditMode => self.check_edit_mode().await.map(ActionOutput::EditMode),
            PageAction::EnterEditPrompt { prompt } => {
                self.enter_edit_prompt(&prompt).await.map(|_| ActionOutput::Ack)
            }
            PageAction::SubmitEditPrompt => self.submit_edit_prompt().await.map(|_| ActionOutput::Ack),
            PageAction::ClickReferenceImage => {
                self.click_reference_image().await.map(|_| ActionOutput::Ack)
            }
            PageAction::GetEditThumbnails => {
                self.document.thumbnails().await.map(ActionOutput::Thumbnails)
            }
            PageAction::WaitForEditGeneration {
                expected_count,
                timeout_ms,
            } => self
                .wait_for_edit_generation(expected_count, Duration::from_millis(timeout_ms))
                .await
                .map(ActionOutput::Generation),
            PageAction::FetchImageBase64 { url } => {
                self.fetch_image_base64(&url).await.map(ActionOutput::Image)
            }
            PageAction::DebugEditDom => self.document.describe().await.map(ActionOutput::Diagnostics),
        }
    }

    /// Describe the page the agent is attached to.
    pub async fn check_page(&self) -> Result<PageStatus, PageError> {
        let url = self.document.location().await?;
        Ok(PageStatus {
            is_target_page: url.contains(&self.page_url_pattern),
            has_upload_input: self.document.exists(Landmark::UploadButton).await?,
            on_generation_view: self.document.exists(Landmark::BackButton).await?,
            url,
        })
    }

    /// Click `landmark`, failing when it is absent.
    async fn click_required(&self, landmark: Landmark) -> Result<(), PageError> {
        if self.document.click(landmark).await? {
            Ok(())
        } else {
            Err(PageError::ElementNotFound(landmark.describe()))
        }
    }

    /// Wait until `landmark` appears, then let the view settle.
    async fn wait_for_view(&self, landmark: Landmark, timeout_message: &str) -> Result<(), PageError> {
        poll_until(
            self.clock.as_ref(),
            self.timings.transition,
            Some(&self.cancel),
            move || async move {
                Ok::<_, PageError>(self.document.exists(landmark).await?.then_some(()))
            },
        )
        .await
        .map_err(|e: PollError<PageError>| e.into_page_error(timeout_message))?;

        debug!("View ready: {}", landmark.describe());
        self.clock.sleep(self.timings.transition_settle).await;
        Ok(())
    }
}

#[async_trait]
impl<D: Document> ActionHandler for PageAgent<D> {
    async fn handle(&self, action: PageAction) -> Result<ActionOutput, String> {
        let name = action.name();
        debug!("Handling adapter action: {}", name);

        self.execute(action).await.map_err(|e| {
            warn!("Adapter action {} failed: {}", name, e);
            e.to_string()
        })
    }

    fn shutdown(&self) {
        debug!("Page agent shut down");
        self.cancel.cancel();
    }
}
