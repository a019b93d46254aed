//! Tab provider attaching page adapters to Chrome tabs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use automator_channel::{Injector, TabChannel};
use automator_config::{BrowserConfig, PageConfig};
use automator_page::{ActionHandler, Clock, PageAgent};
use automator_protocols::{ChannelError, PageChannel, TabProvider, TabRef};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cdp::{CdpClient, CdpError, PageInfo, ScriptRunner, list_pages};
use crate::document::CdpDocument;

/// Mailbox size of each tab's page host.
const HOST_CAPACITY: usize = 16;

/// Browser connection shared by every tab, re-established after it drops.
struct BrowserLink {
    endpoint: String,
    client: tokio::sync::Mutex<Option<Arc<CdpClient>>>,
}

impl BrowserLink {
    fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: tokio::sync::Mutex::new(None),
        }
    }

    /// Live client, connecting on first use and after a disconnect.
    async fn client(&self) -> Result<Arc<CdpClient>, CdpError> {
        let mut slot = self.client.lock().await;
        match slot.as_ref() {
            Some(client) if client.is_connected() => return Ok(client.clone()),
            Some(_) => warn!("Browser connection lost, reconnecting to {}", self.endpoint),
            None => info!("Connecting to browser at {}", self.endpoint),
        }

        let client = Arc::new(CdpClient::connect(&self.endpoint).await?);
        *slot = Some(client.clone());
        Ok(client)
    }
}

/// Attaches a fresh CDP session and agent to one tab on every injection.
struct CdpInjector {
    link: Arc<BrowserLink>,
    target_id: String,
    page: PageConfig,
    page_url_pattern: String,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl Injector for CdpInjector {
    async fn inject(&self) -> Result<Arc<dyn ActionHandler>, ChannelError> {
        let client = self.link.client().await?;
        let session = client.attach_page(&self.target_id).await?;
        debug!("Attached CDP session {} to tab {}", session.session_id(), self.target_id);

        let runner: Arc<dyn ScriptRunner> = Arc::new(session);
        let document = CdpDocument::new(runner, self.page.selectors.clone());
        let agent = PageAgent::new(document, self.clock.clone())
            .with_config(&self.page, &self.page_url_pattern);
        Ok(Arc::new(agent))
    }
}

/// [`TabProvider`] for tabs of a Chrome instance reachable over CDP.
///
/// The browser connection is made on first use and remade when it drops.
/// Each tab keeps one channel; re-injection re-attaches to the same tab.
pub struct CdpTabProvider {
    browser: BrowserConfig,
    page: PageConfig,
    clock: Arc<dyn Clock>,
    link: Arc<BrowserLink>,
    channels: Mutex<HashMap<TabRef, Arc<TabChannel>>>,
}

impl CdpTabProvider {
    pub fn new(browser: BrowserConfig, page: PageConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            link: Arc::new(BrowserLink::new(browser.cdp_endpoint.clone())),
            browser,
            page,
            clock,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Find the generator's tab by URL.
    pub async fn find_tab(&self) -> Result<TabRef, CdpError> {
        let pages = list_pages(&self.browser.cdp_endpoint).await?;
        select_tab(&pages, &self.browser.page_url_pattern)
            .ok_or_else(|| CdpError::PageNotFound(self.browser.page_url_pattern.clone()))
    }
}

/// First regular tab whose URL contains `pattern`.
pub fn select_tab(pages: &[PageInfo], pattern: &str) -> Option<TabRef> {
    pages
        .iter()
        .find(|p| p.is_page() && p.url.contains(pattern))
        .map(|p| TabRef::new(p.id.clone()))
}

#[async_trait]
impl TabProvider for CdpTabProvider {
    async fn open(&self, tab: &TabRef) -> Result<Arc<dyn PageChannel>, ChannelError> {
        if let Some(channel) = self.channels.lock().get(tab).cloned() {
            return Ok(channel);
        }

        let injector = Arc::new(CdpInjector {
            link: self.link.clone(),
            target_id: tab.as_str().to_string(),
            page: self.page.clone(),
            page_url_pattern: self.browser.page_url_pattern.clone(),
            clock: self.clock.clone(),
        });
        let channel = Arc::new(TabChannel::open(tab.clone(), injector, HOST_CAPACITY).await?);

        let channel = self
            .channels
            .lock()
            .entry(tab.clone())
            .or_insert(channel)
            .clone();
        info!("Page adapter attached to tab {}", tab);
        Ok(channel)
    }
}
