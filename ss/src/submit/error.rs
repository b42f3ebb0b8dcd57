//! Submission error types

use std::time::Duration;
use thiserror::Error;

/// Why a submission did not produce an external record
///
/// Both variants are recoverable: the dispatcher re-enqueues the item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Submission rejected: {reason}")]
    Rejected { reason: String },

    #[error("Submission timed out after {0:?}")]
    Timeout(Duration),
}

impl SubmitError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, SubmitError::Timeout(_))
    }
}
