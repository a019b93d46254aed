//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to an already running Chrome over WebSocket and talks the CDP
//! JSON-RPC protocol. Only what the page adapter needs is implemented:
//! target discovery, attaching to a tab and evaluating scripts in it.
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Connect and attach:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://localhost:9222").await?;
//!    let page = client.attach_page(&target_id).await?;
//!    let href = page.evaluate("window.location.href").await?;
//!    ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::{CdpClient, list_pages};
pub use error::CdpError;
pub use protocol::*;
pub use session::{PageSession, ScriptRunner};
