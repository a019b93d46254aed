//! Page host task.

use std::sync::Arc;

use automator_page::ActionHandler;
use automator_protocols::{ActionOutput, PageAction};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// A queued action and, for call-and-await, where to send the reply.
pub struct Envelope {
    pub action: PageAction,
    pub reply: Option<oneshot::Sender<Result<ActionOutput, String>>>,
}

/// Task owning one tab's adapter.
///
/// Actions are executed one at a time in arrival order, so concurrent
/// callers never interleave DOM interactions on the same tab.
pub struct PageHost {
    handler: Arc<dyn ActionHandler>,
    sender: mpsc::Sender<Envelope>,
    task: JoinHandle<()>,
}

impl PageHost {
    /// Spawn a host running `handler` with a mailbox of `capacity` actions.
    pub fn spawn(handler: Arc<dyn ActionHandler>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(capacity.max(1));

        let running = handler.clone();
        let task = tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                trace!("Page host executing {}", envelope.action.name());
                let result = running.handle(envelope.action).await;
                if let Some(reply) = envelope.reply {
                    let _ = reply.send(result);
                }
            }
            debug!("Page host mailbox closed");
        });

        Self {
            handler,
            sender,
            task,
        }
    }

    /// Adapter run by this host.
    pub fn handler(&self) -> &Arc<dyn ActionHandler> {
        &self.handler
    }

    /// Mailbox of this host.
    pub fn sender(&self) -> mpsc::Sender<Envelope> {
        self.sender.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the host. Queued and in-flight actions are dropped unanswered.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PageHost {
    fn drop(&mut self) {
        self.task.abort();
    }
}
