//! Channel to the adapter of one tab.

use std::sync::Arc;

use async_trait::async_trait;
use automator_page::ActionHandler;
use automator_protocols::{ActionOutput, ChannelError, PageAction, PageChannel, TabRef};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::host::{Envelope, PageHost};

/// Produces a fresh adapter for a tab.
#[async_trait]
pub trait Injector: Send + Sync {
    async fn inject(&self) -> Result<Arc<dyn ActionHandler>, ChannelError>;
}

/// Injector that always hands out the same adapter.
pub struct StaticInjector {
    handler: Arc<dyn ActionHandler>,
}

impl StaticInjector {
    pub fn new(handler: Arc<dyn ActionHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Injector for StaticInjector {
    async fn inject(&self) -> Result<Arc<dyn ActionHandler>, ChannelError> {
        Ok(self.handler.clone())
    }
}

/// [`PageChannel`] backed by a [`PageHost`].
pub struct TabChannel {
    tab: TabRef,
    host: Mutex<PageHost>,
    injector: Arc<dyn Injector>,
    capacity: usize,
}

impl TabChannel {
    /// Inject an adapter into `tab` and start its host.
    pub async fn open(
        tab: TabRef,
        injector: Arc<dyn Injector>,
        capacity: usize,
    ) -> Result<Self, ChannelError> {
        let handler = injector.inject().await?;
        debug!("Opened channel to tab {}", tab);

        Ok(Self {
            tab,
            host: Mutex::new(PageHost::spawn(handler, capacity)),
            injector,
            capacity,
        })
    }

    pub fn tab(&self) -> &TabRef {
        &self.tab
    }

    /// Stop the current adapter; calls fail as unreachable until re-injected.
    pub fn disconnect(&self) {
        let host = self.host.lock();
        host.handler().shutdown();
        host.abort();
    }

    fn mailbox(&self) -> mpsc::Sender<Envelope> {
        self.host.lock().sender()
    }

    fn unreachable(&self, reason: &str) -> ChannelError {
        ChannelError::Unreachable(format!("tab {}: {}", self.tab, reason))
    }
}

#[async_trait]
impl PageChannel for TabChannel {
    async fn call(&self, action: PageAction) -> Result<ActionOutput, ChannelError> {
        let (tx, rx) = oneshot::channel();
        self.mailbox()
            .send(Envelope {
                action,
                reply: Some(tx),
            })
            .await
            .map_err(|_| self.unreachable("adapter is not running"))?;

        match rx.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(message)) => Err(ChannelError::Rejected(message)),
            Err(_) => Err(self.unreachable("adapter dropped the request")),
        }
    }

    async fn notify(&self, action: PageAction) -> Result<(), ChannelError> {
        self.mailbox()
            .send(Envelope {
                action,
                reply: None,
            })
            .await
            .map_err(|_| self.unreachable("adapter is not running"))
    }

    async fn reinject(&self) -> Result<(), ChannelError> {
        let handler = self.injector.inject().await?;
        let fresh = PageHost::spawn(handler.clone(), self.capacity);
        let previous = std::mem::replace(&mut *self.host.lock(), fresh);
        if !same_adapter(previous.handler(), &handler) {
            previous.handler().shutdown();
        }
        drop(previous);

        info!("Re-injected page adapter into tab {}", self.tab);
        Ok(())
    }
}

fn same_adapter(a: &Arc<dyn ActionHandler>, b: &Arc<dyn ActionHandler>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

#[cfg(test)]
#[path = "tab_tests.rs"]
mod tests;
