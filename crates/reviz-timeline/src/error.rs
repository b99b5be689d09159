//! Timeline error types.

use thiserror::Error;

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors that can occur during timeline operations.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Imported data could not be parsed into a timeline.
    #[error("parse error: {0}")]
    Parse(String),

    /// Snapshot not found in the timeline.
    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// Underlying storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] reviz_storage::StorageError),

    /// Serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimelineError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = TimelineError::parse("expected array");
        assert_eq!(err.to_string(), "parse error: expected array");
    }

    #[test]
    fn test_not_found_display() {
        let err = TimelineError::not_found("7");
        assert_eq!(err.to_string(), "snapshot not found: 7");
    }
}
