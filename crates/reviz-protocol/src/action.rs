//! Command-style actions sent from the host UI to the engine.

use serde::{Deserialize, Serialize};

/// Actions that can be sent from the host UI to the engine.
///
/// These map to the editor commands the host registers (e.g. the
/// `timeline.export` command in a VS Code-style host).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Export the timeline (or a trailing sub-range of it) as JSON.
    ExportTimeline { scope: ExportScope },

    /// Replace the active document's timeline with a previously exported one.
    ImportTimeline { data: String },

    /// Restore the document to the state captured by a snapshot.
    RestoreSnapshot {
        request_id: String,
        snapshot_id: String,
    },

    /// Rename a snapshot's label.
    RenameSnapshot {
        snapshot_id: String,
        message: String,
    },

    /// Export the rendered preview of a single snapshot as SVG.
    ExportPreview { snapshot_id: String },
}

impl Action {
    /// Get the host command id for this action.
    pub fn command_id(&self) -> &'static str {
        match self {
            Action::ExportTimeline { .. } => "timeline.export",
            Action::ImportTimeline { .. } => "timeline.import",
            Action::RestoreSnapshot { .. } => "timeline.restore",
            Action::RenameSnapshot { .. } => "timeline.rename",
            Action::ExportPreview { .. } => "timeline.exportPreview",
        }
    }
}

/// How much of the timeline an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportScope {
    /// The entire timeline.
    All,
    /// The most recent `count` entries. An absent or zero count means 1.
    Last { count: Option<u32> },
}

impl ExportScope {
    /// The effective entry count for a `Last` scope.
    pub fn effective_count(count: Option<u32>) -> usize {
        match count {
            Some(n) if n >= 1 => n as usize,
            _ => 1,
        }
    }
}
