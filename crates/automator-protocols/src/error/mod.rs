//! Error types for the protocol layer.

mod channel;
mod export;

pub use channel::*;
pub use export::*;
