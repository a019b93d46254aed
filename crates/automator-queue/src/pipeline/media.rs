//! Media pipeline: image upload to video, one item at a time.

use std::time::Duration;

use async_trait::async_trait;
use automator_config::MediaConfig;
use automator_protocols::{
    ActionOutput, Artifact, ChannelError, JobKind, JobSettings, LogStatus, MediaRunConfig,
    PageAction, QueueItem,
};
use tracing::{debug, warn};

use crate::job::{JobState, JobWork};
use crate::runner::{
    RunContext, SETUP_LABEL, SequenceSteps, StepOutcome, ensure_reachable, missing_item,
};
use crate::store::PersistedMediaState;

/// Items and settings of a media run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaWork {
    pub items: Vec<QueueItem>,
    pub config: MediaRunConfig,
}

impl JobWork for MediaWork {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn label(&self, index: usize) -> String {
        self.items
            .get(index)
            .map(|item| item.source_name.clone())
            .unwrap_or_default()
    }

    fn settings(&self) -> JobSettings {
        JobSettings::Media(self.config.clone())
    }
}

/// Per-item steps of the media job.
pub struct MediaPipeline {
    completion_timeout: Duration,
    setup_settle: Duration,
    return_settle: Duration,
}

impl MediaPipeline {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            completion_timeout: config.completion_timeout(),
            setup_settle: config.setup_settle(),
            return_settle: config.return_settle(),
        }
    }

    /// Select video mode and the configured aspect ratio.
    async fn configure_page(&self, ctx: &RunContext<MediaWork>) -> Result<(), ChannelError> {
        ctx.call(PageAction::EnsureVideoMode).await?;
        ctx.sleep(self.setup_settle).await;

        let ratio = ctx.work(|w| w.config.aspect_ratio);
        ctx.call(PageAction::SetAspectRatio { ratio }).await?;
        ctx.sleep(self.setup_settle).await;
        Ok(())
    }
}

impl Default for MediaPipeline {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

#[async_trait]
impl SequenceSteps for MediaPipeline {
    type Work = MediaWork;

    const KIND: JobKind = JobKind::Media;
    const REWIND_ON_COMPLETE: bool = true;

    async fn enter(&self, ctx: &RunContext<MediaWork>, first: bool) -> Result<(), String> {
        ensure_reachable(ctx, self.setup_settle).await?;

        if first {
            if let Err(e) = self.configure_page(ctx).await {
                warn!("Media setup failed, continuing: {}", e);
                ctx.log(SETUP_LABEL, LogStatus::Failed, Some(e.to_string()));
            }
        }
        Ok(())
    }

    async fn step(&self, ctx: &RunContext<MediaWork>, index: usize) -> Result<StepOutcome, String> {
        let item = ctx
            .work(|w| w.items.get(index).cloned())
            .ok_or_else(|| missing_item(index))?;

        debug!("Uploading image: {}", item.source_name);
        ctx.call(PageAction::UploadImage {
            payload: item.payload,
            filename: item.source_name.clone(),
        })
        .await
        .map_err(|e| e.to_string())?;

        debug!("Waiting for video generation...");
        let output = ctx
            .call(PageAction::WaitForVideoCompletion {
                timeout_ms: self.completion_timeout.as_millis() as u64,
            })
            .await
            .map_err(|e| e.to_string())?;

        match output {
            ActionOutput::Video(Some(url)) if !url.is_empty() => Ok(StepOutcome::Produced(
                Artifact::new(item.output_name, url).with_origin(item.source_name),
            )),
            _ => Err("Failed to get video URL".to_string()),
        }
    }

    async fn after_step(&self, ctx: &RunContext<MediaWork>, index: usize) {
        if index + 1 >= ctx.work(|w| w.len()) {
            return;
        }
        match ctx.call(PageAction::GoBack).await {
            Ok(_) => ctx.sleep(self.return_settle).await,
            Err(e) => warn!("Failed to go back: {}", e),
        }
    }

    fn completion_message(&self, produced: usize) -> String {
        format!("Complete! {} videos ready for download.", produced)
    }

    fn checkpoint(&self, state: &JobState<MediaWork>) -> Option<PersistedMediaState> {
        Some(PersistedMediaState::capture(state))
    }
}
