//! The orchestrator: owns both jobs and answers control commands.

use std::sync::Arc;

use async_trait::async_trait;
use automator_config::Config;
use automator_page::Clock;
use automator_protocols::{
    ActionOutput, ArtifactSummary, AspectRatio, ChannelError, ControlCommand, ControlHandler,
    ControlReply, EditRunConfig, ExportError, Exporter, JobKind, JobSnapshot, MediaRunConfig,
    Notifier, PageAction, QueueItem, ReplyData, TabProvider, TabRef,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::QueueError;
use crate::pipeline::{EditPipeline, EditWork, MediaPipeline, MediaWork};
use crate::runner::SequenceRunner;
use crate::store::StateStore;

/// External collaborators of the orchestrator.
#[derive(Clone)]
pub struct Collaborators {
    pub tabs: Arc<dyn TabProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub exporter: Arc<dyn Exporter>,
    /// Where media state is persisted; `None` disables persistence.
    pub store: Option<Arc<dyn StateStore>>,
    pub clock: Arc<dyn Clock>,
}

/// Owns the media and edit jobs.
pub struct Orchestrator {
    media: Arc<SequenceRunner<MediaPipeline>>,
    edit: Arc<SequenceRunner<EditPipeline>>,
    tabs: Arc<dyn TabProvider>,
    exporter: Arc<dyn Exporter>,
    store: Option<Arc<dyn StateStore>>,
}

impl Orchestrator {
    /// Create a new orchestrator with idle jobs.
    pub fn new(
        media: MediaPipeline,
        edit: EditPipeline,
        media_settings: MediaRunConfig,
        collaborators: Collaborators,
    ) -> Self {
        let media_work = MediaWork {
            items: Vec::new(),
            config: media_settings,
        };
        Self {
            media: SequenceRunner::new(media, media_work, &collaborators),
            edit: SequenceRunner::new(edit, EditWork::default(), &collaborators),
            tabs: collaborators.tabs,
            exporter: collaborators.exporter,
            store: collaborators.store,
        }
    }

    /// Create an orchestrator using the pipeline settings of `config`.
    pub fn from_config(config: &Config, collaborators: Collaborators) -> Self {
        Self::new(
            MediaPipeline::new(&config.media),
            EditPipeline::new(&config.edit),
            config.media.run_config(),
            collaborators,
        )
    }

    pub fn media(&self) -> &Arc<SequenceRunner<MediaPipeline>> {
        &self.media
    }

    pub fn edit(&self) -> &Arc<SequenceRunner<EditPipeline>> {
        &self.edit
    }

    /// Load the persisted media state, if any. Returns whether state was found.
    pub async fn restore(&self) -> Result<bool, QueueError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let Some(saved) = store.load().await? else {
            return Ok(false);
        };

        let phase = saved.restored_phase();
        info!(
            "Restored media state: {} items, cursor {}, phase {:?}",
            saved.items.len(),
            saved.cursor,
            phase
        );
        self.media.cell().update(|s| saved.restore_into(s));
        self.media.persist().await;
        Ok(true)
    }

    pub async fn start_media(
        &self,
        items: Vec<QueueItem>,
        config: MediaRunConfig,
        tab: TabRef,
    ) -> Result<(), QueueError> {
        self.media.start(MediaWork { items, config }, tab).await
    }

    pub async fn start_edit(
        &self,
        prompts: Vec<String>,
        config: EditRunConfig,
        tab: TabRef,
    ) -> Result<(), QueueError> {
        self.edit.start(EditWork::new(prompts, config), tab).await
    }

    pub async fn pause(&self, kind: JobKind) -> Result<(), QueueError> {
        match kind {
            JobKind::Media => self.media.pause().await,
            JobKind::Edit => self.edit.pause().await,
        }
    }

    pub async fn resume(&self, kind: JobKind) -> Result<(), QueueError> {
        match kind {
            JobKind::Media => self.media.resume().await,
            JobKind::Edit => self.edit.resume().await,
        }
    }

    pub async fn stop(&self, kind: JobKind) -> Result<(), QueueError> {
        match kind {
            JobKind::Media => self.media.stop().await,
            JobKind::Edit => self.edit.stop().await,
        }
    }

    pub fn state(&self, kind: JobKind) -> JobSnapshot {
        match kind {
            JobKind::Media => self.media.snapshot(),
            JobKind::Edit => self.edit.snapshot(),
        }
    }

    pub fn artifacts(&self, kind: JobKind) -> Vec<ArtifactSummary> {
        let artifacts = match kind {
            JobKind::Media => self.media.artifacts(),
            JobKind::Edit => self.edit.artifacts(),
        };
        artifacts
            .iter()
            .enumerate()
            .map(|(i, a)| ArtifactSummary::from_artifact(i, a))
            .collect()
    }

    /// Empty the result store of `kind`. A no-op when already empty.
    pub fn clear_artifacts(&self, kind: JobKind) -> usize {
        let cleared = match kind {
            JobKind::Media => self.media.clear_artifacts(),
            JobKind::Edit => self.edit.clear_artifacts(),
        };
        debug!("Cleared {} {} artifacts", cleared, kind);
        cleared
    }

    /// Export every artifact of `kind` into its output folder, then drop the
    /// exported artifacts. Returns the written count and the folder.
    pub async fn export_all(&self, kind: JobKind) -> Result<(usize, String), QueueError> {
        let (artifacts, folder) = match kind {
            JobKind::Media => (
                self.media.artifacts(),
                self.media.cell().read(|s| s.work.config.output_folder.clone()),
            ),
            JobKind::Edit => (
                self.edit.artifacts(),
                self.edit.cell().read(|s| s.work.config.output_folder.clone()),
            ),
        };
        if artifacts.is_empty() {
            return Err(ExportError::Empty.into());
        }

        let count = self.exporter.export(&folder, &artifacts).await?;
        match kind {
            JobKind::Media => self.media.remove_artifacts(&artifacts),
            JobKind::Edit => self.edit.remove_artifacts(&artifacts),
        }

        info!("Exported {} {} artifacts to {}", count, kind, folder);
        Ok((count, folder))
    }

    /// Change the persisted media settings.
    pub async fn update_settings(
        &self,
        aspect_ratio: Option<AspectRatio>,
        output_folder: Option<String>,
    ) {
        self.media
            .update_work(|w| {
                if let Some(ratio) = aspect_ratio {
                    w.config.aspect_ratio = ratio;
                }
                if let Some(folder) = output_folder {
                    w.config.output_folder = folder;
                }
            })
            .await;
    }

    /// Ask the adapter in `tab` to describe the edit page.
    pub async fn inspect_page(&self, tab: &TabRef) -> Result<Value, QueueError> {
        let channel = self.tabs.open(tab).await?;
        match channel.call(PageAction::DebugEditDom).await? {
            ActionOutput::Diagnostics(value) => Ok(value),
            other => Err(ChannelError::UnexpectedReply {
                action: "debugEditDom".to_string(),
                reply: format!("{:?}", other),
            }
            .into()),
        }
    }
}

#[async_trait]
impl ControlHandler for Orchestrator {
    async fn handle(&self, command: ControlCommand) -> ControlReply {
        let result = match command {
            ControlCommand::StartMedia { items, config, tab } => {
                self.start_media(items, config, tab).await.map(|_| None)
            }
            ControlCommand::StartEdit {
                prompts,
                config,
                tab,
            } => self.start_edit(prompts, config, tab).await.map(|_| None),
            ControlCommand::Pause { kind } => self.pause(kind).await.map(|_| None),
            ControlCommand::Resume { kind } => self.resume(kind).await.map(|_| None),
            ControlCommand::Stop { kind } => self.stop(kind).await.map(|_| None),
            ControlCommand::GetState { kind } => {
                Ok(Some(ReplyData::State(Box::new(self.state(kind)))))
            }
            ControlCommand::ListArtifacts { kind } => {
                Ok(Some(ReplyData::Artifacts(self.artifacts(kind))))
            }
            ControlCommand::ClearArtifacts { kind } => {
                self.clear_artifacts(kind);
                Ok(None)
            }
            ControlCommand::ExportAll { kind } => self
                .export_all(kind)
                .await
                .map(|(count, folder)| Some(ReplyData::Exported { count, folder })),
            ControlCommand::UpdateSettings {
                aspect_ratio,
                output_folder,
            } => {
                self.update_settings(aspect_ratio, output_folder).await;
                Ok(None)
            }
            ControlCommand::InspectPage { tab } => self
                .inspect_page(&tab)
                .await
                .map(|value| Some(ReplyData::Diagnostics(value))),
        };

        match result {
            Ok(Some(data)) => ControlReply::with_data(data),
            Ok(None) => ControlReply::ok(),
            Err(e) => {
                debug!("Control command failed: {}", e);
                ControlReply::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
