//! # Automator Page CDP
//!
//! Page adapter backend driving a live Chrome tab over the Chrome DevTools
//! Protocol.
//!
//! ## Setup
//!
//! Start Chrome with remote debugging enabled and log in to the generator:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! The automator attaches to the existing tab, so the browser session and
//! its logins are used as-is.
//!
//! ## Features
//!
//! - [`CdpClient`](cdp::CdpClient): target discovery and WebSocket sessions
//! - [`CdpDocument`]: the [`Document`](automator_page::Document) capabilities
//!   as scripts evaluated in the tab
//! - [`CdpTabProvider`]: opens a [`TabChannel`](automator_channel::TabChannel)
//!   per tab, re-attaching on re-injection

pub mod cdp;
pub mod document;
pub mod provider;
pub mod script;

pub use document::CdpDocument;
pub use provider::{CdpTabProvider, select_tab};
pub use script::{Locator, Scripts};
