//! Video generation actions.

use std::time::Duration;

use automator_protocols::{AspectRatio, ImagePayload};
use tracing::{debug, info};

use super::PageAgent;
use crate::document::{Document, Landmark};
use crate::error::{PageError, PollError};
use crate::poll::{PollSpec, poll_until};
use crate::upload::UploadFile;

impl<D: Document> PageAgent<D> {
    /// Switch the model selector to video generation unless already there.
    pub async fn ensure_video_mode(&self) -> Result<(), PageError> {
        let label = self
            .document
            .text(Landmark::ModelSelector)
            .await?
            .ok_or_else(|| PageError::ElementNotFound(Landmark::ModelSelector.describe()))?;

        if label.contains(&self.video_mode_marker) {
            debug!("Video mode already selected");
            return Ok(());
        }

        self.click_required(Landmark::ModelSelector).await?;
        self.clock.sleep(self.timings.control_settle).await;

        if !self.document.click(Landmark::VideoModeOption).await? {
            self.document.click(Landmark::Body).await?;
            return Err(PageError::ElementNotFound(Landmark::VideoModeOption.describe()));
        }

        self.clock.sleep(self.timings.control_settle).await;
        info!("Video mode selected");
        Ok(())
    }

    /// Pick `ratio` in the model selector menu.
    ///
    /// A missing ratio button is not an error: the menu hides the button of
    /// the ratio that is already active.
    pub async fn set_aspect_ratio(&self, ratio: AspectRatio) -> Result<(), PageError> {
        self.click_required(Landmark::ModelSelector).await?;
        self.clock.sleep(self.timings.control_settle).await;

        if !self.document.click(Landmark::AspectRatioButton(ratio)).await? {
            self.document.click(Landmark::Body).await?;
            debug!("Aspect ratio button {} not found, may already be set", ratio);
            return Ok(());
        }
        self.clock.sleep(self.timings.option_settle).await;

        self.document.click(Landmark::Body).await?;
        self.clock.sleep(self.timings.dismiss_settle).await;
        info!("Aspect ratio set to {}", ratio);
        Ok(())
    }

    /// Attach an image and wait for the generation view.
    pub async fn upload_image(&self, payload: &ImagePayload, filename: &str) -> Result<(), PageError> {
        let file = UploadFile::from_payload(payload, filename).await?;

        if !self.document.attach_file(Landmark::FileInput, &file).await? {
            return Err(PageError::ElementNotFound(Landmark::FileInput.describe()));
        }
        info!("Uploaded image: {}", filename);

        self.wait_for_view(Landmark::BackButton, "Timeout waiting for generation page")
            .await
    }

    /// Wait until the video element has a source and is fully buffered.
    pub async fn wait_for_video_completion(&self, timeout: Duration) -> Result<String, PageError> {
        debug!("Waiting for video generation (timeout {:?})", timeout);

        let url = poll_until(
            self.clock.as_ref(),
            PollSpec::new(self.timings.video_poll, timeout),
            Some(&self.cancel),
            move || async move {
                let media = self.document.media(Landmark::Video).await?;
                Ok::<_, PageError>(media.filter(|m| m.is_complete()).map(|m| m.src))
            },
        )
        .await
        .map_err(|e: PollError<PageError>| e.into_page_error("Video generation timeout"))?;

        info!("Video generation complete");
        Ok(url)
    }

    /// Current video source, if any.
    pub async fn video_url(&self) -> Result<Option<String>, PageError> {
        let media = self.document.media(Landmark::Video).await?;
        Ok(media.map(|m| m.src).filter(|src| !src.is_empty()))
    }

    /// Leave the generation view and wait for the main view.
    pub async fn go_back(&self) -> Result<(), PageError> {
        self.click_required(Landmark::BackButton).await?;
        debug!("Clicked back button");

        self.wait_for_view(Landmark::UploadButton, "Timeout waiting for main page")
            .await
    }
}
