//! Job state owned by the orchestrator.

use automator_protocols::{Artifact, JobLog, JobPhase, JobSettings, TabRef};
use parking_lot::Mutex;

/// The work list of a job kind.
pub trait JobWork: Clone + Send + Sync + 'static {
    /// Number of items in the run.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log label of the item at `index`.
    fn label(&self, index: usize) -> String;

    /// Settings shown in snapshots.
    fn settings(&self) -> JobSettings;
}

/// Mutable state of one job.
#[derive(Debug, Clone)]
pub struct JobState<W> {
    pub work: W,
    pub phase: JobPhase,
    /// Index of the next item to process; the in-flight item while one runs.
    pub cursor: usize,
    pub log: JobLog,
    pub artifacts: Vec<Artifact>,
    pub tab: Option<TabRef>,
    pub current_label: Option<String>,
    pub last_error: Option<String>,
    generation: u64,
    driver: Option<u64>,
    driver_seq: u64,
}

/// Registration of the task driving a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverLease {
    pub generation: u64,
    pub id: u64,
}

impl<W: JobWork> JobState<W> {
    fn new(work: W) -> Self {
        Self {
            work,
            phase: JobPhase::Idle,
            cursor: 0,
            log: JobLog::new(),
            artifacts: Vec::new(),
            tab: None,
            current_label: None,
            last_error: None,
            generation: 0,
            driver: None,
            driver_seq: 0,
        }
    }

    /// Run generation; bumped by every `start`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the work list and begin a new run.
    ///
    /// The new run's driver is registered immediately; any driver of an
    /// earlier run loses its lease.
    pub(crate) fn begin_run(&mut self, work: W, tab: TabRef) -> DriverLease {
        self.work = work;
        self.tab = Some(tab);
        self.cursor = 0;
        self.log.clear();
        self.artifacts.clear();
        self.current_label = None;
        self.last_error = None;
        self.phase = JobPhase::Running;
        self.generation += 1;
        self.claim_driver()
    }

    /// Whether a driver task currently holds the lease.
    pub(crate) fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Register a new driver for the current run.
    pub(crate) fn claim_driver(&mut self) -> DriverLease {
        self.driver_seq += 1;
        self.driver = Some(self.driver_seq);
        DriverLease {
            generation: self.generation,
            id: self.driver_seq,
        }
    }

    /// Give up `lease` if it is still the registered driver.
    pub(crate) fn release_driver(&mut self, lease: DriverLease) {
        if self.driver == Some(lease.id) {
            self.driver = None;
        }
    }

    /// End the run in `phase` unless it already ended.
    pub(crate) fn terminate(&mut self, phase: JobPhase) {
        if self.phase.is_processing() {
            self.phase = phase;
            self.cursor = 0;
        }
        self.current_label = None;
    }
}

/// Lock-protected job state.
///
/// Guards are never held across an await; every access goes through a
/// closure.
pub struct JobCell<W> {
    state: Mutex<JobState<W>>,
}

impl<W: JobWork> JobCell<W> {
    /// Create a new idle job holding `work`.
    pub fn new(work: W) -> Self {
        Self {
            state: Mutex::new(JobState::new(work)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&JobState<W>) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut JobState<W>) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Apply `f` only while `generation` is still the current run.
    pub fn update_if_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut JobState<W>) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        (state.generation == generation).then(|| f(&mut state))
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }
}
