//! Messaging channel between the orchestrator and a page adapter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{ActionOutput, PageAction};
use crate::error::ChannelError;
use crate::types::TabRef;

/// Request/response transport to the adapter driving one tab.
///
/// Every `call` resolves exactly once. Transport failures surface as
/// [`ChannelError::Unreachable`], application failures reported by the
/// adapter as [`ChannelError::Rejected`]. There is no transport timeout;
/// long waits are bounded by the action's own timeout.
#[async_trait]
pub trait PageChannel: Send + Sync {
    /// Send an action and await its single reply.
    async fn call(&self, action: PageAction) -> Result<ActionOutput, ChannelError>;

    /// Send an action without waiting for the reply.
    async fn notify(&self, action: PageAction) -> Result<(), ChannelError>;

    /// Re-establish the adapter in the tab.
    async fn reinject(&self) -> Result<(), ChannelError>;
}

/// Opens channels to tabs.
#[async_trait]
pub trait TabProvider: Send + Sync {
    /// Open a channel to `tab`, failing if the tab cannot be reached.
    async fn open(&self, tab: &TabRef) -> Result<Arc<dyn PageChannel>, ChannelError>;
}
