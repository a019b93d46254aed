//! The two job kinds, as steps of a [`SequenceRunner`](crate::SequenceRunner).

mod edit;
mod media;

pub use edit::{EditPipeline, EditWork};
pub use media::{MediaPipeline, MediaWork};
