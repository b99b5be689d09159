//! Capture policy configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the capture coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Whether captures are enabled.
    pub enabled: bool,

    /// Minimum interval between successful captures, in milliseconds.
    /// Signals arriving sooner are dropped. Zero disables debouncing.
    pub debounce_ms: u64,

    /// Label attached to snapshots produced by a file-save capture.
    pub capture_message: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
            capture_message: "File saved".to_string(),
        }
    }
}

impl CaptureConfig {
    /// The debounce interval as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
