//! # Automator Queue
//!
//! The job queue orchestrator: owns one media and one edit job, drives each
//! through the page adapter and keeps their results.
//!
//! ## Features
//!
//! - [`SequenceRunner`]: resumable sequential run loop shared by both job kinds
//! - [`MediaPipeline`] / [`EditPipeline`]: per-item steps of each job kind
//! - [`Orchestrator`]: control command handling over both runners
//! - [`StateStore`]: persisted media state ([`MemoryStateStore`], [`FileStateStore`])
//! - [`FolderExporter`]: writes artifacts into an output folder
//! - [`TracingNotifier`] / [`WebhookNotifier`]: completion notifications

pub mod error;
pub mod export;
pub mod job;
pub mod notify;
pub mod orchestrator;
pub mod pipeline;
pub mod runner;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{QueueError, StoreError};
pub use export::FolderExporter;
pub use job::{DriverLease, JobCell, JobState, JobWork};
pub use notify::{FanoutNotifier, TracingNotifier, WebhookNotifier};
pub use orchestrator::{Collaborators, Orchestrator};
pub use pipeline::{EditPipeline, EditWork, MediaPipeline, MediaWork};
pub use runner::{RunContext, SequenceRunner, SequenceSteps, StepOutcome};
pub use store::{FileStateStore, MemoryStateStore, PersistedMediaState, StateStore};
