//! Common data types shared across the automator.

mod artifact;
mod item;
mod job;
mod log;
mod settings;

pub use artifact::*;
pub use item::*;
pub use job::*;
pub use log::*;
pub use settings::*;
