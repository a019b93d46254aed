//! Image edit actions.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::PageAgent;
use crate::document::{Document, Landmark};
use crate::error::{PageError, PollError};
use crate::poll::{PollSpec, poll_until};

impl<D: Document> PageAgent<D> {
    /// Whether the edit prompt input is present.
    pub async fn check_edit_mode(&self) -> Result<bool, PageError> {
        let in_edit_mode = self.document.exists(Landmark::EditPrompt).await?;
        debug!("checkEditMode: {}", in_edit_mode);
        Ok(in_edit_mode)
    }

    /// Replace the edit prompt text.
    pub async fn enter_edit_prompt(&self, prompt: &str) -> Result<(), PageError> {
        if !self.document.set_value(Landmark::EditPrompt, "").await? {
            return Err(PageError::WrongState(
                "Edit mode textarea not found. Make sure you are in image edit mode.".to_string(),
            ));
        }
        self.clock.sleep(self.timings.clear_settle).await;

        self.document.set_value(Landmark::EditPrompt, prompt).await?;
        self.clock.sleep(self.timings.input_settle).await;
        debug!("Entered edit prompt ({} chars)", prompt.chars().count());
        Ok(())
    }

    /// Submit the prompt: the send button when there is one, Enter otherwise.
    pub async fn submit_edit_prompt(&self) -> Result<(), PageError> {
        if !self.document.exists(Landmark::EditPrompt).await? {
            return Err(PageError::WrongState("Edit mode textarea not found.".to_string()));
        }

        if self.document.click(Landmark::SubmitButton).await? {
            debug!("Submitted edit prompt via button click");
        } else {
            self.document.press_enter(Landmark::EditPrompt).await?;
            debug!("Submitted edit prompt via Enter key");
        }

        self.clock.sleep(self.timings.control_settle).await;
        Ok(())
    }

    /// Focus the first sidebar thumbnail so the next edit applies to the original.
    pub async fn click_reference_image(&self) -> Result<(), PageError> {
        if !self.document.exists(Landmark::Sidebar).await? {
            return Err(PageError::WrongState(
                "Sidebar not found. Make sure you are in image edit mode.".to_string(),
            ));
        }
        if !self.document.click(Landmark::ReferenceThumbnail).await? {
            return Err(PageError::WrongState("No thumbnails found in sidebar.".to_string()));
        }

        self.clock.sleep(self.timings.control_settle).await;
        debug!("Clicked reference image thumbnail");
        Ok(())
    }

    /// Wait until the sidebar holds at least `expected` thumbnails.
    pub async fn wait_for_edit_generation(
        &self,
        expected: usize,
        timeout: Duration,
    ) -> Result<usize, PageError> {
        debug!("Waiting for {} thumbnails in sidebar", expected);

        let waited = poll_until(
            self.clock.as_ref(),
            PollSpec::new(self.timings.thumbnail_poll, timeout),
            Some(&self.cancel),
            move || async move {
                let count = self.document.count(Landmark::Thumbnail).await?;
                Ok::<_, PageError>((count >= expected).then_some(count))
            },
        )
        .await;

        match waited {
            Ok(count) => {
                info!("Generation complete: {} thumbnails (expected {})", count, expected);
                self.clock.sleep(self.timings.thumbnail_settle).await;
                Ok(count)
            }
            Err(PollError::Timeout(_)) => {
                let got = self.document.count(Landmark::Thumbnail).await.unwrap_or(0);
                warn!("Generation wait timed out at {}/{}", got, expected);
                Err(PageError::Timeout(format!(
                    "Timeout waiting for generations. Got {}/{} thumbnails.",
                    got, expected
                )))
            }
            Err(e) => Err(e.into_page_error("Timeout waiting for generations")),
        }
    }

    /// Return the image at `url` as a data URL.
    pub async fn fetch_image_base64(&self, url: &str) -> Result<String, PageError> {
        if url.starts_with("data:") {
            return Ok(url.to_string());
        }
        self.document.fetch_data_url(url).await
    }
}
