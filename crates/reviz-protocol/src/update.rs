//! Update types pushed from the engine to the host UI.

use serde::{Deserialize, Serialize};

/// Updates pushed from the engine to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// The active timeline changed (capture, preview fill, rename, restore,
    /// import, or session swap).
    TimelineChanged { snapshots: Vec<SnapshotInfo> },

    /// A restore request finished.
    RestoreCompleted {
        request_id: String,
        outcome: RestoreOutcome,
    },

    /// A timeline export is ready to be written by the host.
    ExportReady { file_name: String, data: String },

    /// A single-snapshot SVG export is ready.
    PreviewReady { file_name: String, svg: String },
}

/// Summary of one snapshot for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: String,
    pub timestamp: String,
    pub message: String,
    pub has_preview: bool,
}

/// Result of a restore request.
///
/// Restore used to be fire-and-forget; the outcome is reported explicitly so
/// the caller can distinguish success from a missing snapshot or a resource
/// that could not be written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// The timeline was truncated and all resources written back.
    Restored { snapshot_id: String },
    /// The snapshot id is not in the timeline; nothing changed.
    NotFound,
    /// The timeline was truncated but at least one resource write failed.
    PartialWriteFailure { uri: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serde() {
        let update = Update::RestoreCompleted {
            request_id: "req_1".to_string(),
            outcome: RestoreOutcome::Restored {
                snapshot_id: "2".to_string(),
            },
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"restore_completed\""));
        assert!(json.contains("\"restored\""));

        let parsed: Update = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, update);
    }

    #[test]
    fn test_restore_outcome_not_found() {
        let json = serde_json::to_string(&RestoreOutcome::NotFound).unwrap();
        assert_eq!(json, "{\"status\":\"not_found\"}");
    }
}
