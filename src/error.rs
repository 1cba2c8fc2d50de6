//! Crate-wide error type.
//!
//! `spec.md` §7 splits failures into kinds with different propagation
//! policies: only queue-full and lifecycle-misuse errors are meant to reach
//! the producer; everything else (out-of-memory, encoding overflow,
//! transport failure, response parse failure) is logged and swallowed by
//! the component that observed it. `VelError` models all of them in one
//! enum so call sites can match on `category()` rather than re-deriving the
//! propagation policy ad hoc.

use std::fmt;

/// Stable error surface for the crate.
///
/// Mirrors the kinds enumerated in `spec.md` §7. `Transport` wraps whatever
/// the caller's [`crate::transport::Transport`] implementation returned, so
/// the underlying HTTP/IO error is preserved in `source()`.
#[derive(Debug, thiserror::Error)]
pub enum VelError {
    /// `post_event` could not enqueue: the ring buffer was full. The caller
    /// retains ownership of the event (§4.6, §7).
    #[error("ring buffer full, event rejected")]
    QueueFull,

    /// `post_event`/`terminate` called outside the state that permits them
    /// (post before init, post after terminate has been requested).
    #[error("library lifecycle misuse: {0}")]
    LifecycleMisuse(&'static str),

    /// A mandatory field, or an out-of-range enum value, was supplied to a
    /// factory or setter. Treated as a programmer bug: surfaced, not
    /// silently masked (§7).
    #[error("precondition violated: {0}")]
    Precondition(&'static str),

    /// The encoder could not fit the event in the configured buffer size.
    /// Carries whether truncation landed inside a string literal (in which
    /// case the caller may still have usable, if partial, JSON) or not (in
    /// which case the event was dropped).
    #[error("encoding buffer overflow (truncated_in_string={truncated_in_string})")]
    EncodingOverflow { truncated_in_string: bool },

    /// The configured transport failed to deliver the POST. The event is
    /// dropped; there is no retry queue (§4.6, §7).
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The collector's response body could not be parsed as a recognized
    /// command document. The connection remains usable (§7).
    #[error("response parse error: {0}")]
    ParseError(String),

    /// The platform metadata collaborator could not be reached. Non-fatal
    /// by contract (§4.8); retained here only so `initialize` can log it.
    #[error("platform metadata lookup failed: {0}")]
    MetadataUnavailable(String),
}

/// Disposition of an error: who is allowed to see it, and whether retrying
/// makes sense. Only [`ErrorCategory::Producer`] errors propagate out of
/// `post_event`/`terminate`; everything else is logged by the component
/// that caught it and swallowed (§7 propagation policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Reaches the calling producer thread as a `Result::Err`.
    Producer,
    /// Logged by the consumer/response-parser and otherwise ignored.
    Swallowed,
}

impl VelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VelError::QueueFull | VelError::LifecycleMisuse(_) | VelError::Precondition(_) => {
                ErrorCategory::Producer
            }
            VelError::EncodingOverflow { .. }
            | VelError::Transport(_)
            | VelError::ParseError(_)
            | VelError::MetadataUnavailable(_) => ErrorCategory::Swallowed,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VelError>;

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Producer => write!(f, "producer"),
            ErrorCategory::Swallowed => write!(f, "swallowed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_full_is_producer_visible() {
        assert_eq!(VelError::QueueFull.category(), ErrorCategory::Producer);
    }

    #[test]
    fn transport_errors_are_swallowed() {
        let err = VelError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "boom",
        )));
        assert_eq!(err.category(), ErrorCategory::Swallowed);
    }
}
