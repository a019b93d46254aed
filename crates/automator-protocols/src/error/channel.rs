//! Channel errors.

use thiserror::Error;

/// Errors from a [`PageChannel`](crate::PageChannel) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The adapter could not be reached or never replied.
    #[error("Page adapter unreachable: {0}")]
    Unreachable(String),

    /// The adapter handled the request and reported a failure.
    #[error("{0}")]
    Rejected(String),

    /// The adapter replied with an output of the wrong shape.
    #[error("Unexpected reply to {action}: {reply}")]
    UnexpectedReply { action: String, reply: String },
}

impl ChannelError {
    /// Whether this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChannelError::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_bare_message() {
        let err = ChannelError::Rejected("Video generation timeout".to_string());
        assert_eq!(err.to_string(), "Video generation timeout");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_unreachable_is_transport() {
        let err = ChannelError::Unreachable("host gone".to_string());
        assert!(err.is_transport());
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_unexpected_reply_display() {
        let err = ChannelError::UnexpectedReply {
            action: "getVideoUrl".to_string(),
            reply: "Ack".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("getVideoUrl"));
        assert!(display.contains("Ack"));
    }
}
