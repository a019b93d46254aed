//! # Automator Protocols
//!
//! Core protocol definitions for the Imagine automator.
//! Contains data types and interface definitions only - no implementations.
//!
//! ## Core Traits
//!
//! - [`PageChannel`] - Request/response transport to the adapter driving a tab
//! - [`TabProvider`] - Opens a [`PageChannel`] for a tab reference
//! - [`ControlHandler`] - Receives control commands from a UI surface
//! - [`Notifier`] - Delivers completion notifications
//! - [`Exporter`] - Packages artifacts into an output folder

pub mod action;
pub mod channel;
pub mod control;
pub mod error;
pub mod export;
pub mod notify;
pub mod types;

pub use action::{ActionOutput, PageAction, PageStatus, Thumbnail};
pub use channel::{PageChannel, TabProvider};
pub use control::{ControlCommand, ControlHandler, ControlReply, ReplyData};
pub use error::{ChannelError, ExportError, NotifyError};
pub use export::Exporter;
pub use notify::{Notification, Notifier};
pub use types::*;
