//! Test doubles for the page channel and the orchestrator's collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use automator_page::ManualClock;
use automator_protocols::{
    ActionOutput, Artifact, ChannelError, ExportError, Exporter, JobKind, JobSnapshot,
    Notification, NotifyError, Notifier, PageAction, PageChannel, TabProvider, TabRef, Thumbnail,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::orchestrator::Collaborators;
use crate::store::{MemoryStateStore, StateStore};

type Reply = Result<ActionOutput, ChannelError>;

/// Blocks an action until the test releases it.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until a gated action is in flight.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one gated action complete.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Scripted page channel recording every action it receives.
#[derive(Default)]
pub struct FakeChannel {
    calls: Mutex<Vec<PageAction>>,
    scripted: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    gates: Mutex<HashMap<&'static str, Arc<Gate>>>,
    reinjections: AtomicUsize,
    video_counter: AtomicUsize,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply for the next call of `action`.
    pub fn script(&self, action: &'static str, reply: Reply) {
        self.scripted
            .lock()
            .entry(action)
            .or_default()
            .push_back(reply);
    }

    /// Gate every call of `action`.
    pub fn gate(&self, action: &'static str) -> Arc<Gate> {
        self.gates
            .lock()
            .entry(action)
            .or_insert_with(|| Arc::new(Gate::default()))
            .clone()
    }

    /// Stop gating `action`; calls already waiting stay blocked until released.
    pub fn ungate(&self, action: &'static str) {
        self.gates.lock().remove(action);
    }

    pub fn calls(&self) -> Vec<PageAction> {
        self.calls.lock().clone()
    }

    /// Names of the actions received, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|a| a.name()).collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.calls.lock().iter().filter(|a| a.name() == action).count()
    }

    /// Filenames of the uploads, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|a| match a {
                PageAction::UploadImage { filename, .. } => Some(filename.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reinjections(&self) -> usize {
        self.reinjections.load(Ordering::SeqCst)
    }

    fn default_reply(&self, action: &PageAction) -> Reply {
        match action {
            PageAction::CheckEditMode => Ok(ActionOutput::EditMode(true)),
            PageAction::WaitForVideoCompletion { .. } => {
                let n = self.video_counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(ActionOutput::Video(Some(format!(
                    "https://assets.example/video-{}.mp4",
                    n
                ))))
            }
            PageAction::GetEditThumbnails => Ok(ActionOutput::Thumbnails(Vec::new())),
            PageAction::WaitForEditGeneration { expected_count, .. } => {
                Ok(ActionOutput::Generation(*expected_count))
            }
            PageAction::FetchImageBase64 { url } => Ok(ActionOutput::Image(format!(
                "data:image/png;base64,{}",
                url.len()
            ))),
            PageAction::DebugEditDom => {
                Ok(ActionOutput::Diagnostics(serde_json::json!({"textareas": 1})))
            }
            _ => Ok(ActionOutput::Ack),
        }
    }
}

#[async_trait]
impl PageChannel for FakeChannel {
    async fn call(&self, action: PageAction) -> Result<ActionOutput, ChannelError> {
        let name = action.name();
        self.calls.lock().push(action.clone());

        let gate = self.gates.lock().get(name).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let scripted = self
            .scripted
            .lock()
            .get_mut(name)
            .and_then(|replies| replies.pop_front());
        scripted.unwrap_or_else(|| self.default_reply(&action))
    }

    async fn notify(&self, action: PageAction) -> Result<(), ChannelError> {
        self.calls.lock().push(action);
        Ok(())
    }

    async fn reinject(&self) -> Result<(), ChannelError> {
        self.reinjections.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider handing out one shared [`FakeChannel`] for known tabs.
pub struct FakeTabs {
    channel: Arc<FakeChannel>,
}

impl FakeTabs {
    pub fn new(channel: Arc<FakeChannel>) -> Arc<Self> {
        Arc::new(Self { channel })
    }
}

#[async_trait]
impl TabProvider for FakeTabs {
    async fn open(&self, tab: &TabRef) -> Result<Arc<dyn PageChannel>, ChannelError> {
        if tab.as_str() == "missing" {
            return Err(ChannelError::Unreachable(format!("no tab {}", tab)));
        }
        Ok(self.channel.clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingExporter {
    exports: Mutex<Vec<(String, Vec<Artifact>)>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl RecordingExporter {
    pub fn exports(&self) -> Vec<(String, Vec<Artifact>)> {
        self.exports.lock().clone()
    }

    /// Hold every export until the test releases it.
    pub fn gate(&self) -> Arc<Gate> {
        self.gate
            .lock()
            .get_or_insert_with(|| Arc::new(Gate::default()))
            .clone()
    }
}

#[async_trait]
impl Exporter for RecordingExporter {
    async fn export(&self, folder: &str, artifacts: &[Artifact]) -> Result<usize, ExportError> {
        if artifacts.is_empty() {
            return Err(ExportError::Empty);
        }
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.exports
            .lock()
            .push((folder.to_string(), artifacts.to_vec()));
        Ok(artifacts.len())
    }
}

/// Collaborators wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub channel: Arc<FakeChannel>,
    pub notifier: Arc<RecordingNotifier>,
    pub exporter: Arc<RecordingExporter>,
    pub store: Arc<MemoryStateStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            channel: FakeChannel::new(),
            notifier: Arc::new(RecordingNotifier::default()),
            exporter: Arc::new(RecordingExporter::default()),
            store: Arc::new(MemoryStateStore::new()),
            clock: Arc::new(ManualClock::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            tabs: FakeTabs::new(self.channel.clone()),
            notifier: self.notifier.clone(),
            exporter: self.exporter.clone(),
            store: Some(self.store.clone() as Arc<dyn StateStore>),
            clock: self.clock.clone(),
        }
    }
}

pub fn thumbnails(count: usize) -> Vec<Thumbnail> {
    (0..count)
        .map(|i| Thumbnail {
            src: format!("https://assets.example/thumb-{}.png", i),
            alt: String::new(),
            index: i,
        })
        .collect()
}

pub fn tab() -> TabRef {
    TabRef::new("T1")
}

/// Poll `snapshot` until `done` holds, failing after a few seconds.
pub async fn wait_until(
    snapshot: impl Fn() -> JobSnapshot,
    done: impl Fn(&JobSnapshot) -> bool,
) -> JobSnapshot {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let current = snapshot();
            if done(&current) {
                return current;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await;
    match result {
        Ok(snapshot) => snapshot,
        Err(_) => panic!("timed out waiting; last state: {:?}", snapshot()),
    }
}

/// Wait until the run of `kind` has ended and its driver has exited.
pub async fn wait_finished(snapshot: impl Fn() -> JobSnapshot, kind: JobKind) -> JobSnapshot {
    let finished = wait_until(snapshot, |s| !s.processing).await;
    assert_eq!(finished.kind, kind);
    // Let the driver task finish its persistence and notification.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
    finished
}
