//! Schedule error types

use thiserror::Error;

/// Errors raised while building rules or expanding descriptors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Invalid shorthand '{token}': {reason}")]
    Shorthand { token: String, reason: String },
}

impl ScheduleError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor(reason.into())
    }

    pub(crate) fn shorthand(token: &str, reason: impl Into<String>) -> Self {
        Self::Shorthand {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScheduleError::malformed("weekday set is empty");
        assert_eq!(err.to_string(), "Malformed descriptor: weekday set is empty");

        let err = ScheduleError::shorthand("le-x", "expected 5 or 6 fields");
        assert_eq!(err.to_string(), "Invalid shorthand 'le-x': expected 5 or 6 fields");
    }
}
