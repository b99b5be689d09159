//! Error types for the core crate.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Timeline error.
    #[error("timeline error: {0}")]
    Timeline(#[from] reviz_timeline::TimelineError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] reviz_storage::StorageError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem watch error.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// No editing client is connected.
    #[error("no active editing client")]
    NoActiveClient,

    /// The snapshot exists but carries no rendered preview.
    #[error("snapshot {0} has no preview")]
    NoPreview(String),

    /// The document model failed to deliver its resources.
    #[error("model error: {0}")]
    Model(String),
}

impl CoreError {
    /// Create a model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
