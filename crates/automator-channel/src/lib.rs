//! # Automator Channel
//!
//! Request/response messaging for the automator.
//!
//! ## Features
//!
//! - [`PageHost`]: one task per tab owning the adapter, executing actions in
//!   arrival order
//! - [`TabChannel`]: [`PageChannel`](automator_protocols::PageChannel) over a
//!   page host, with re-injection through an [`Injector`]
//! - [`ControlClient`] / [`serve_control`]: UI surface to orchestrator transport

mod control;
mod host;
mod tab;

pub use control::{ControlClient, serve_control};
pub use host::{Envelope, PageHost};
pub use tab::{Injector, StaticInjector, TabChannel};
