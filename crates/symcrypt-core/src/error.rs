use std::time::Duration;

use thiserror::Error;

pub type SymcryptResult<T> = Result<T, SymcryptError>;

/// Root cause carried by [`SymcryptError::OperationFailed`].
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SymcryptError {
    /// Unknown identifier, wrong key/IV length, or an invalid option.
    /// Raised at construction and never worth retrying.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: expected {expected}, got {actual}")]
    InvalidInput { expected: String, actual: String },

    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    /// A block task failed; the whole buffer is abandoned.
    #[error("operation failed at block {block}: {source}")]
    OperationFailed {
        block: usize,
        #[source]
        source: TaskError,
    },

    #[error("worker pool did not stop within {timeout:?} ({pending} workers still running)")]
    ResourceShutdown { pending: usize, timeout: Duration },

    #[error("key exchange error: {0}")]
    KeyExchange(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SymcryptError {
    pub fn invalid_length(what: &str, expected: usize, actual: usize) -> Self {
        SymcryptError::InvalidInput {
            expected: format!("{what} of {expected} bytes"),
            actual: format!("{actual} bytes"),
        }
    }

    pub fn task_failed(block: usize, source: impl Into<TaskError>) -> Self {
        SymcryptError::OperationFailed {
            block,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_length_message() {
        let err = SymcryptError::invalid_length("block", 16, 15);
        assert_eq!(
            err.to_string(),
            "invalid input: expected block of 16 bytes, got 15 bytes"
        );
    }

    #[test]
    fn operation_failed_keeps_root_cause() {
        let cause = SymcryptError::invalid_length("block", 16, 3);
        let err = SymcryptError::task_failed(7, cause);

        assert!(err.to_string().starts_with("operation failed at block 7"));
        let source = err.source().expect("root cause must be attached");
        assert!(source.to_string().contains("3 bytes"));
    }

    #[test]
    fn task_failed_accepts_plain_strings() {
        let err = SymcryptError::task_failed(0, "worker panicked");
        assert!(matches!(err, SymcryptError::OperationFailed { block: 0, .. }));
    }
}
