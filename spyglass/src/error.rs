use std::time::Duration;

/// The single error type for all Spyglass operations.
///
/// Every fallible Spyglass API returns `spyglass::Result<T>` (alias for
/// `Result<T, spyglass::Error>`). Assertion failures and lookups on an
/// empty history are reported synchronously to the caller; nothing is
/// retried or swallowed internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("No value recorded yet")]
    NoValueRecorded,

    #[error("Assertion failed: {0}")]
    AssertionMismatch(String),

    #[error("No value arrived within {0:?}: {1} values recorded")]
    WaitTimeout(Duration, usize),

    #[error("Source requires a Tokio runtime to forward values")]
    RuntimeUnavailable,

    #[error("Source is already closed")]
    SourceClosed,
}

impl Error {
    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Error::AssertionMismatch(message.into())
    }

    /// Returns `true` for failures raised by an assertion method.
    ///
    /// An assertion on an empty history reports [`Error::NoValueRecorded`],
    /// which also counts as an assertion failure.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::AssertionMismatch(_) | Error::NoValueRecorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_is_prefixed() {
        let err = Error::mismatch("expected 1, got 2");
        assert_eq!(err.to_string(), "Assertion failed: expected 1, got 2");
        assert!(err.is_assertion());
    }

    #[test]
    fn timeout_reports_duration_and_count() {
        let err = Error::WaitTimeout(Duration::from_millis(5), 3);
        assert_eq!(err.to_string(), "No value arrived within 5ms: 3 values recorded");
        assert!(!err.is_assertion());
    }

    #[test]
    fn source_errors_are_not_assertions() {
        assert!(!Error::RuntimeUnavailable.is_assertion());
        assert!(!Error::SourceClosed.is_assertion());
        assert!(Error::NoValueRecorded.is_assertion());
    }
}
