//! Edit pipeline: submit prompts against a reference image, then collect
//! one generated image per prompt.

use std::time::Duration;

use async_trait::async_trait;
use automator_config::EditConfig;
use automator_protocols::{
    ActionOutput, Artifact, ChannelError, EditRunConfig, JobKind, JobSettings, LogStatus,
    PageAction, Thumbnail, edit_output_name, prompt_label,
};
use tracing::{debug, info, warn};

use crate::job::JobWork;
use crate::runner::{RunContext, SequenceSteps, StepOutcome, ensure_reachable, missing_item};

pub const EDIT_MODE_VERIFIED_LABEL: &str = "Edit mode verified";
pub const WAITING_LABEL: &str = "Waiting for generations...";
pub const COLLECTING_LABEL: &str = "Collecting images...";

pub const NOT_IN_EDIT_MODE: &str =
    "Not in edit mode. Upload an image, click \"Editar imagen\", then try again.";

/// Prompts and settings of an edit run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditWork {
    pub prompts: Vec<String>,
    pub config: EditRunConfig,
    /// Thumbnails present before the first prompt; kept across resumes.
    pub initial_thumbnails: Option<usize>,
}

impl EditWork {
    pub fn new(prompts: Vec<String>, config: EditRunConfig) -> Self {
        Self {
            prompts,
            config,
            initial_thumbnails: None,
        }
    }
}

impl JobWork for EditWork {
    fn len(&self) -> usize {
        self.prompts.len()
    }

    fn label(&self, index: usize) -> String {
        self.prompts
            .get(index)
            .map(|prompt| prompt_label(index, prompt))
            .unwrap_or_default()
    }

    fn settings(&self) -> JobSettings {
        JobSettings::Edit(self.config.clone())
    }
}

/// Thumbnail count once every prompt has produced its variants.
pub fn expected_thumbnail_count(initial: usize, prompts: usize, variants: usize) -> usize {
    initial + variants * prompts
}

/// Pick one generated thumbnail per prompt: the first variant of each.
///
/// Thumbnails before `initial` are the reference images. A prompt whose
/// slot is missing is skipped.
pub fn select_generated(
    thumbnails: &[Thumbnail],
    initial: usize,
    prompts: usize,
    variants: usize,
) -> Vec<(usize, &Thumbnail)> {
    let generated = thumbnails.get(initial..).unwrap_or_default();
    (0..prompts)
        .filter_map(|p| generated.get(p * variants).map(|thumb| (p, thumb)))
        .collect()
}

/// Per-prompt steps of the edit job.
pub struct EditPipeline {
    generation_timeout: Duration,
    variants_per_prompt: usize,
    reinject_settle: Duration,
    reference_settle: Duration,
    prompt_settle: Duration,
}

impl EditPipeline {
    pub fn new(config: &EditConfig) -> Self {
        Self {
            generation_timeout: config.generation_timeout(),
            variants_per_prompt: config.variants_per_prompt.max(1),
            reinject_settle: config.reinject_settle(),
            reference_settle: config.reference_settle(),
            prompt_settle: config.prompt_settle(),
        }
    }

    async fn verify_edit_mode(&self, ctx: &RunContext<EditWork>) -> Result<(), String> {
        match ctx.call(PageAction::CheckEditMode).await {
            Ok(ActionOutput::EditMode(true)) => Ok(()),
            Ok(_) => Err(NOT_IN_EDIT_MODE.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn count_thumbnails(&self, ctx: &RunContext<EditWork>) -> usize {
        match ctx.call(PageAction::GetEditThumbnails).await {
            Ok(ActionOutput::Thumbnails(thumbnails)) => thumbnails.len(),
            _ => {
                debug!("Could not get initial thumbnail count, assuming 1");
                1
            }
        }
    }

    /// Fetch `url` as a data URL through the page, falling back to the URL.
    async fn fetch_inline(&self, ctx: &RunContext<EditWork>, url: &str) -> String {
        match ctx
            .call(PageAction::FetchImageBase64 {
                url: url.to_string(),
            })
            .await
        {
            Ok(ActionOutput::Image(data)) if !data.is_empty() => data,
            Ok(_) => url.to_string(),
            Err(e) => {
                warn!("Could not fetch {} as base64, keeping original URL: {}", url, e);
                url.to_string()
            }
        }
    }

    async fn wait_for_generations(&self, ctx: &RunContext<EditWork>, expected: usize) {
        ctx.log(WAITING_LABEL, LogStatus::Processing, None);
        debug!("Waiting for {} thumbnails", expected);

        let result = ctx
            .call(PageAction::WaitForEditGeneration {
                expected_count: expected,
                timeout_ms: self.generation_timeout.as_millis() as u64,
            })
            .await;
        match result {
            Ok(_) => ctx.log(WAITING_LABEL, LogStatus::Completed, None),
            Err(e) => {
                warn!("Timeout or error waiting for all generations: {}", e);
                ctx.log(WAITING_LABEL, LogStatus::Failed, Some(e.to_string()));
            }
        }
    }

    async fn collect(&self, ctx: &RunContext<EditWork>, prompts: &[String], initial: usize) {
        ctx.log(COLLECTING_LABEL, LogStatus::Processing, None);

        let thumbnails = match ctx.call(PageAction::GetEditThumbnails).await {
            Ok(ActionOutput::Thumbnails(thumbnails)) if !thumbnails.is_empty() => thumbnails,
            Ok(ActionOutput::Thumbnails(_)) => {
                ctx.log(
                    COLLECTING_LABEL,
                    LogStatus::Failed,
                    Some("No thumbnails found".to_string()),
                );
                return;
            }
            Ok(other) => {
                let e = ChannelError::UnexpectedReply {
                    action: "getEditThumbnails".to_string(),
                    reply: format!("{:?}", other),
                };
                ctx.log(COLLECTING_LABEL, LogStatus::Failed, Some(e.to_string()));
                return;
            }
            Err(e) => {
                ctx.log(COLLECTING_LABEL, LogStatus::Failed, Some(e.to_string()));
                return;
            }
        };

        let chosen = select_generated(
            &thumbnails,
            initial,
            prompts.len(),
            self.variants_per_prompt,
        );
        for (p, thumb) in chosen {
            let reference = self.fetch_inline(ctx, &thumb.src).await;
            let prompt = &prompts[p];
            ctx.push_artifact(
                Artifact::new(edit_output_name(p, prompt), reference).with_origin(prompt.clone()),
            );
            ctx.log(&prompt_label(p, prompt), LogStatus::Completed, None);
        }

        ctx.log(COLLECTING_LABEL, LogStatus::Completed, None);
    }
}

impl Default for EditPipeline {
    fn default() -> Self {
        Self::new(&EditConfig::default())
    }
}

#[async_trait]
impl SequenceSteps for EditPipeline {
    type Work = EditWork;

    const KIND: JobKind = JobKind::Edit;
    const REWIND_ON_COMPLETE: bool = false;

    async fn enter(&self, ctx: &RunContext<EditWork>, _first: bool) -> Result<(), String> {
        ensure_reachable(ctx, self.reinject_settle).await?;
        self.verify_edit_mode(ctx).await?;
        ctx.log(EDIT_MODE_VERIFIED_LABEL, LogStatus::Completed, None);

        if ctx.work(|w| w.initial_thumbnails.is_none()) {
            let count = self.count_thumbnails(ctx).await;
            ctx.update_work(|w| w.initial_thumbnails = Some(count));
        }
        Ok(())
    }

    async fn step(&self, ctx: &RunContext<EditWork>, index: usize) -> Result<StepOutcome, String> {
        let (prompt, delay) = ctx
            .work(|w| {
                let prompt = w.prompts.get(index).cloned()?;
                Some((prompt, Duration::from_secs(w.config.delay_secs)))
            })
            .ok_or_else(|| missing_item(index))?;

        if index > 0 {
            debug!("Clicking reference image before next prompt");
            ctx.call(PageAction::ClickReferenceImage)
                .await
                .map_err(|e| e.to_string())?;
            ctx.sleep(self.reference_settle).await;
        }

        ctx.call(PageAction::EnterEditPrompt { prompt })
            .await
            .map_err(|e| e.to_string())?;
        ctx.sleep(self.prompt_settle).await;

        ctx.call(PageAction::SubmitEditPrompt)
            .await
            .map_err(|e| e.to_string())?;

        debug!("Waiting {}s delay", delay.as_secs());
        ctx.sleep(delay).await;
        Ok(StepOutcome::Submitted)
    }

    async fn complete(&self, ctx: &RunContext<EditWork>) {
        let (prompts, initial) =
            ctx.work(|w| (w.prompts.clone(), w.initial_thumbnails.unwrap_or(1)));
        let expected = expected_thumbnail_count(initial, prompts.len(), self.variants_per_prompt);

        self.wait_for_generations(ctx, expected).await;
        self.collect(ctx, &prompts, initial).await;

        info!("Edit run collected images for {} prompts", prompts.len());
    }

    fn completion_message(&self, produced: usize) -> String {
        format!("Image editing complete! {} images ready for download.", produced)
    }
}
