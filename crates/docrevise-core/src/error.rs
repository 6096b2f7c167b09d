//! Error types for the reconciliation core

use thiserror::Error;

/// Errors raised by the reconciliation core
#[derive(Error, Debug)]
pub enum ReviseError {
    /// A span list does not tile the text it is applied to
    #[error("style spans cover {covered} characters, text has {expected}")]
    SpanCoverage {
        /// Character length of the text
        expected: usize,
        /// Characters covered by the spans
        covered: usize,
    },

    /// A change journal could not record an entry
    #[error("change journal error: {reason}")]
    Journal {
        /// Description of the failure
        reason: String,
    },

    /// I/O failure while writing a journal
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviseError {
    /// Create a journal error
    pub fn journal(reason: impl Into<String>) -> Self {
        Self::Journal {
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, ReviseError>;
