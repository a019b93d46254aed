//! # Automator Page
//!
//! The page adapter: everything that runs against a single tab.
//!
//! ## Features
//!
//! - [`Document`] capability interface over a tab's DOM, addressed by [`Landmark`]
//! - [`poll_until`] wait primitive with typed timeout and an injectable [`Clock`]
//! - [`PageAgent`] executing each [`PageAction`](automator_protocols::PageAction)
//!   as a sequence of document capabilities

pub mod agent;
pub mod clock;
pub mod document;
pub mod error;
pub mod poll;
pub mod upload;

pub use agent::{ActionHandler, AgentTimings, PageAgent};
pub use clock::{Clock, ManualClock, TokioClock};
pub use document::{Document, Landmark, MediaState};
pub use error::{PageError, PollError};
pub use poll::{PollSpec, poll_until};
pub use upload::UploadFile;
