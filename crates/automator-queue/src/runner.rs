//! Resumable sequential run loop shared by both job kinds.
//!
//! A run walks the job's items from the cursor to the end, one at a time.
//! Pause and stop are cooperative: they are observed only at item
//! boundaries, so an in-flight item always finishes first.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use automator_page::Clock;
use automator_protocols::{
    ActionOutput, Artifact, ChannelError, JobKind, JobPhase, JobSnapshot, LogStatus, Notification,
    Notifier, PageAction, PageChannel, TabProvider, TabRef,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::QueueError;
use crate::job::{DriverLease, JobCell, JobState, JobWork};
use crate::orchestrator::Collaborators;
use crate::store::{PersistedMediaState, StateStore};

/// Log label of run-level setup failures.
pub const SETUP_LABEL: &str = "Setup";

/// Log label of a panic caught in a run loop.
pub const UNEXPECTED_ERROR_LABEL: &str = "Unexpected error";

/// Title of completion notifications.
pub const NOTIFICATION_TITLE: &str = "Grok Automator";

/// Error recorded when the adapter stays unreachable after re-injection.
pub const UNREACHABLE_MESSAGE: &str =
    "Content script not available. Please refresh the page and try again.";

/// Result of processing one item.
#[derive(Debug)]
pub enum StepOutcome {
    /// The item produced an artifact and is complete.
    Produced(Artifact),
    /// The item was handed to the page; its result is collected later.
    Submitted,
}

/// Per-kind behavior plugged into a [`SequenceRunner`].
#[async_trait]
pub trait SequenceSteps: Send + Sync + 'static {
    type Work: JobWork;

    const KIND: JobKind;

    /// Whether a completed run leaves the cursor at 0 rather than at the end.
    const REWIND_ON_COMPLETE: bool;

    /// Run preconditions, executed on every start and resume.
    ///
    /// `first` is set when the run has not processed any item yet. An error
    /// aborts the run and is logged against [`SETUP_LABEL`].
    async fn enter(&self, ctx: &RunContext<Self::Work>, first: bool) -> Result<(), String>;

    /// Process the item at `index`. Errors are logged against the item and
    /// the loop moves on.
    async fn step(&self, ctx: &RunContext<Self::Work>, index: usize) -> Result<StepOutcome, String>;

    /// Runs after every item, whatever its outcome.
    async fn after_step(&self, _ctx: &RunContext<Self::Work>, _index: usize) {}

    /// Runs once every item has been processed.
    async fn complete(&self, _ctx: &RunContext<Self::Work>) {}

    /// Notification text for a completed run that produced `produced` artifacts.
    fn completion_message(&self, produced: usize) -> String;

    /// Durable record of `state`, for kinds that persist.
    fn checkpoint(&self, _state: &JobState<Self::Work>) -> Option<PersistedMediaState> {
        None
    }
}

/// What the steps of one run may touch.
///
/// Every mutation is fenced by the run generation, so a run that was
/// superseded by a newer `start` can no longer change the job.
pub struct RunContext<W> {
    cell: Arc<JobCell<W>>,
    generation: u64,
    channel: Arc<dyn PageChannel>,
    clock: Arc<dyn Clock>,
}

impl<W: JobWork> RunContext<W> {
    pub fn new(
        cell: Arc<JobCell<W>>,
        generation: u64,
        channel: Arc<dyn PageChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cell,
            generation,
            channel,
            clock,
        }
    }

    /// Whether this run is still the job's current run.
    pub fn is_current(&self) -> bool {
        self.cell.generation() == self.generation
    }

    /// Send an adapter action and await its reply.
    pub async fn call(&self, action: PageAction) -> Result<ActionOutput, ChannelError> {
        if !self.is_current() {
            return Err(ChannelError::Unreachable("run was superseded".to_string()));
        }
        debug!("Sending {}", action.name());
        self.channel.call(action).await
    }

    pub async fn reinject(&self) -> Result<(), ChannelError> {
        if !self.is_current() {
            return Err(ChannelError::Unreachable("run was superseded".to_string()));
        }
        self.channel.reinject().await
    }

    /// Settle delay.
    pub async fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration).await;
    }

    pub fn log(&self, label: &str, status: LogStatus, error: Option<String>) {
        self.cell
            .update_if_current(self.generation, |s| s.log.upsert(label, status, error));
    }

    pub fn work<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        self.cell.read(|s| f(&s.work))
    }

    pub fn update_work(&self, f: impl FnOnce(&mut W)) {
        self.cell.update_if_current(self.generation, |s| f(&mut s.work));
    }

    pub fn push_artifact(&self, artifact: Artifact) {
        self.cell
            .update_if_current(self.generation, |s| s.artifacts.push(artifact));
    }
}

/// Step failure for an index the current work no longer holds.
pub fn missing_item(index: usize) -> String {
    format!("Item {} is no longer queued", index + 1)
}

/// Ping the adapter; on failure re-inject it once, settle and ping again.
pub async fn ensure_reachable<W: JobWork>(
    ctx: &RunContext<W>,
    settle: Duration,
) -> Result<(), String> {
    let Err(first) = ctx.call(PageAction::Ping).await else {
        return Ok(());
    };
    warn!("Page adapter not reachable ({}), re-injecting", first);

    if let Err(e) = ctx.reinject().await {
        warn!("Re-injection failed: {}", e);
        return Err(UNREACHABLE_MESSAGE.to_string());
    }
    ctx.sleep(settle).await;

    match ctx.call(PageAction::Ping).await {
        Ok(_) => {
            info!("Page adapter reachable after re-injection");
            Ok(())
        }
        Err(e) => {
            warn!("Page adapter still unreachable: {}", e);
            Err(UNREACHABLE_MESSAGE.to_string())
        }
    }
}

enum Boundary {
    Item(usize, String),
    Done,
    Suspend,
    Halt,
}

enum RunExit {
    Completed,
    Suspended,
    Halted,
    Aborted(String),
    Panicked(String),
}

/// Owns one job and drives its runs.
pub struct SequenceRunner<S: SequenceSteps> {
    steps: S,
    cell: Arc<JobCell<S::Work>>,
    channel: Mutex<Option<Arc<dyn PageChannel>>>,
    tabs: Arc<dyn TabProvider>,
    notifier: Arc<dyn Notifier>,
    store: Option<Arc<dyn StateStore>>,
    clock: Arc<dyn Clock>,
}

impl<S: SequenceSteps> SequenceRunner<S> {
    /// Create a new idle runner holding `work`.
    pub fn new(steps: S, work: S::Work, collaborators: &Collaborators) -> Arc<Self> {
        Arc::new(Self {
            steps,
            cell: Arc::new(JobCell::new(work)),
            channel: Mutex::new(None),
            tabs: collaborators.tabs.clone(),
            notifier: collaborators.notifier.clone(),
            store: collaborators.store.clone(),
            clock: collaborators.clock.clone(),
        })
    }

    pub fn kind(&self) -> JobKind {
        S::KIND
    }

    pub fn cell(&self) -> &JobCell<S::Work> {
        &self.cell
    }

    /// Begin a new run over `work` in `tab`.
    ///
    /// Returns once the run loop is spawned.
    pub async fn start(self: &Arc<Self>, work: S::Work, tab: TabRef) -> Result<(), QueueError> {
        if work.is_empty() {
            return Err(QueueError::EmptyQueue(S::KIND));
        }
        if self.cell.read(|s| s.phase.is_processing()) {
            return Err(QueueError::AlreadyRunning(S::KIND));
        }

        let channel = self.tabs.open(&tab).await?;
        let total = work.len();
        let lease = self.cell.update(|s| {
            if s.phase.is_processing() {
                return Err(QueueError::AlreadyRunning(S::KIND));
            }
            Ok(s.begin_run(work, tab.clone()))
        })?;
        *self.channel.lock() = Some(channel.clone());

        info!("Starting {} run: {} items in tab {}", S::KIND, total, tab);
        self.persist().await;
        self.spawn_driver(lease, channel);
        Ok(())
    }

    /// Request a pause at the next item boundary. Pausing twice is a no-op.
    pub async fn pause(&self) -> Result<(), QueueError> {
        self.cell.update(|s| match s.phase {
            JobPhase::Running => {
                s.phase = JobPhase::Paused;
                Ok(())
            }
            JobPhase::Paused => Ok(()),
            _ => Err(QueueError::NotProcessing(S::KIND)),
        })?;

        info!("Pausing {} run", S::KIND);
        self.persist().await;
        Ok(())
    }

    /// Continue a paused run from its cursor.
    pub async fn resume(self: &Arc<Self>) -> Result<(), QueueError> {
        let claimed = self.cell.update(|s| match s.phase {
            JobPhase::Running => Ok(None),
            JobPhase::Paused => {
                let Some(tab) = s.tab.clone() else {
                    return Err(QueueError::NoTab(S::KIND));
                };
                s.phase = JobPhase::Running;
                // A driver that has not reached its boundary yet keeps going.
                if s.has_driver() {
                    Ok(None)
                } else {
                    Ok(Some((s.claim_driver(), tab)))
                }
            }
            _ => Err(QueueError::NotProcessing(S::KIND)),
        })?;

        if let Some((lease, tab)) = claimed {
            let channel = match self.channel_for(&tab).await {
                Ok(channel) => channel,
                Err(e) => {
                    self.cell.update(|s| {
                        s.release_driver(lease);
                        if s.phase == JobPhase::Running {
                            s.phase = JobPhase::Paused;
                        }
                    });
                    return Err(e);
                }
            };
            info!("Resuming {} run at item {}", S::KIND, self.cell.read(|s| s.cursor) + 1);
            self.spawn_driver(lease, channel);
        }

        self.persist().await;
        Ok(())
    }

    /// End the run. An in-flight item still finishes and is logged.
    pub async fn stop(&self) -> Result<(), QueueError> {
        self.cell.update(|s| {
            if !s.phase.is_processing() {
                return Err(QueueError::NotProcessing(S::KIND));
            }
            s.terminate(JobPhase::Stopped);
            Ok(())
        })?;

        info!("Stopped {} run", S::KIND);
        self.persist().await;
        Ok(())
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.cell.read(|s| JobSnapshot {
            kind: S::KIND,
            phase: s.phase,
            processing: s.phase.is_processing(),
            paused: s.phase.is_paused(),
            cursor: s.cursor,
            total: s.work.len(),
            current_label: s.current_label.clone(),
            log: s.log.entries().to_vec(),
            settings: s.work.settings(),
            artifact_count: s.artifacts.len(),
            last_error: s.last_error.clone(),
        })
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.cell.read(|s| s.artifacts.clone())
    }

    /// Empty the result store, returning how many artifacts were dropped.
    pub fn clear_artifacts(&self) -> usize {
        self.cell.update(|s| std::mem::take(&mut s.artifacts).len())
    }

    /// Remove `exported` from the result store, one stored copy per entry.
    ///
    /// Artifacts appended after `exported` was read stay in the store.
    pub fn remove_artifacts(&self, exported: &[Artifact]) {
        self.cell.update(|s| {
            for artifact in exported {
                if let Some(pos) = s.artifacts.iter().position(|a| a == artifact) {
                    s.artifacts.remove(pos);
                }
            }
        });
    }

    /// Change the work settings outside of a run's control flow.
    pub async fn update_work(&self, f: impl FnOnce(&mut S::Work)) {
        self.cell.update(|s| f(&mut s.work));
        self.persist().await;
    }

    /// Write the job's checkpoint, if this kind persists.
    pub async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let Some(record) = self.cell.read(|s| self.steps.checkpoint(s)) else {
            return;
        };
        if let Err(e) = store.save(&record).await {
            warn!("Failed to persist {} state: {}", S::KIND, e);
        }
    }

    async fn channel_for(&self, tab: &TabRef) -> Result<Arc<dyn PageChannel>, QueueError> {
        if let Some(channel) = self.channel.lock().clone() {
            return Ok(channel);
        }
        let channel = self.tabs.open(tab).await?;
        *self.channel.lock() = Some(channel.clone());
        Ok(channel)
    }

    fn spawn_driver(self: &Arc<Self>, lease: DriverLease, channel: Arc<dyn PageChannel>) {
        let runner = self.clone();
        tokio::spawn(async move {
            let task = tokio::spawn(runner.clone().run(lease, channel));
            let exit = match task.await {
                Ok(exit) => exit,
                Err(e) if e.is_panic() => RunExit::Panicked(panic_message(e.into_panic())),
                Err(e) => RunExit::Panicked(e.to_string()),
            };
            runner.finish(lease, exit).await;
        });
    }

    async fn run(self: Arc<Self>, lease: DriverLease, channel: Arc<dyn PageChannel>) -> RunExit {
        let generation = lease.generation;
        let ctx = RunContext::new(self.cell.clone(), generation, channel, self.clock.clone());

        let first = self.cell.read(|s| s.cursor == 0);
        if let Err(message) = self.steps.enter(&ctx, first).await {
            return RunExit::Aborted(message);
        }

        loop {
            let boundary = self
                .cell
                .update_if_current(generation, |s| match s.phase {
                    JobPhase::Running if s.cursor >= s.work.len() => Boundary::Done,
                    JobPhase::Running => {
                        let label = s.work.label(s.cursor);
                        s.current_label = Some(label.clone());
                        s.log.upsert(&label, LogStatus::Processing, None);
                        Boundary::Item(s.cursor, label)
                    }
                    JobPhase::Paused => {
                        s.current_label = None;
                        s.release_driver(lease);
                        Boundary::Suspend
                    }
                    _ => Boundary::Halt,
                })
                .unwrap_or(Boundary::Halt);

            match boundary {
                Boundary::Item(index, label) => {
                    self.persist().await;
                    debug!("{} item {}: {}", S::KIND, index + 1, label);

                    let outcome = self.steps.step(&ctx, index).await;
                    if let Err(e) = &outcome {
                        warn!("{} item '{}' failed: {}", S::KIND, label, e);
                    }
                    self.cell.update_if_current(generation, |s| match outcome {
                        Ok(StepOutcome::Produced(artifact)) => {
                            s.log.upsert(&label, LogStatus::Completed, None);
                            s.artifacts.push(artifact);
                        }
                        Ok(StepOutcome::Submitted) => {}
                        Err(e) => s.log.upsert(&label, LogStatus::Failed, Some(e)),
                    });

                    self.steps.after_step(&ctx, index).await;
                    self.cell.update_if_current(generation, |s| {
                        if s.phase.is_processing() {
                            s.cursor = index + 1;
                        }
                    });
                    self.persist().await;
                }
                Boundary::Done => {
                    self.steps.complete(&ctx).await;
                    return RunExit::Completed;
                }
                Boundary::Suspend => {
                    info!(
                        "{} run paused before item {}",
                        S::KIND,
                        self.cell.read(|s| s.cursor) + 1
                    );
                    return RunExit::Suspended;
                }
                Boundary::Halt => return RunExit::Halted,
            }
        }
    }

    async fn finish(&self, lease: DriverLease, exit: RunExit) {
        let produced = self.cell.update(|s| {
            s.release_driver(lease);
            if s.generation() != lease.generation {
                return None;
            }
            match &exit {
                RunExit::Completed if s.phase.is_processing() => {
                    s.phase = JobPhase::Completed;
                    s.cursor = if S::REWIND_ON_COMPLETE { 0 } else { s.work.len() };
                    s.current_label = None;
                    Some(s.artifacts.len())
                }
                RunExit::Aborted(message) => {
                    s.log.upsert(SETUP_LABEL, LogStatus::Failed, Some(message.clone()));
                    s.last_error = Some(message.clone());
                    s.terminate(JobPhase::Aborted);
                    None
                }
                RunExit::Panicked(message) => {
                    s.log
                        .upsert(UNEXPECTED_ERROR_LABEL, LogStatus::Failed, Some(message.clone()));
                    s.last_error = Some(message.clone());
                    s.terminate(JobPhase::Aborted);
                    None
                }
                _ => None,
            }
        });

        match &exit {
            RunExit::Aborted(message) => warn!("{} run aborted: {}", S::KIND, message),
            RunExit::Panicked(message) => error!("{} run loop panicked: {}", S::KIND, message),
            RunExit::Halted => debug!("{} run loop exited", S::KIND),
            RunExit::Completed | RunExit::Suspended => {}
        }
        self.persist().await;

        if let Some(count) = produced {
            info!("{} run complete: {} artifacts", S::KIND, count);
            let notification = Notification::new(
                S::KIND,
                NOTIFICATION_TITLE,
                self.steps.completion_message(count),
            );
            if let Err(e) = self.notifier.notify(&notification).await {
                warn!("Failed to deliver notification: {}", e);
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "run loop panicked".to_string()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
