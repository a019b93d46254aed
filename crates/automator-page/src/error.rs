//! Page adapter errors.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while executing an adapter action.
#[derive(Debug, Error)]
pub enum PageError {
    /// A required element is missing.
    #[error("Could not find {0}")]
    ElementNotFound(String),

    /// The page is not in the state the action requires.
    #[error("{0}")]
    WrongState(String),

    /// A wait ran out of time.
    #[error("{0}")]
    Timeout(String),

    /// Upload payload could not be prepared.
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    /// Error from the document backend (browser connection, script errors).
    #[error("Page backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from [`poll_until`](crate::poll_until).
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The predicate never held within the timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The wait was cancelled.
    #[error("Wait cancelled")]
    Cancelled,

    /// The probe itself failed.
    #[error("{0}")]
    Probe(E),
}

impl PollError<PageError> {
    /// Flatten into a [`PageError`], using `timeout_message` for timeouts.
    pub fn into_page_error(self, timeout_message: impl Into<String>) -> PageError {
        match self {
            PollError::Timeout(_) => PageError::Timeout(timeout_message.into()),
            PollError::Cancelled => PageError::WrongState("Wait cancelled".to_string()),
            PollError::Probe(e) => e,
        }
    }
}
