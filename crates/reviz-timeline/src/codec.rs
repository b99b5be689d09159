//! Import/export codec for timelines.
//!
//! The portable form is a pretty-printed UTF-8 JSON array of snapshots in
//! timeline order. Exports cover either the whole timeline or its trailing
//! `N` entries; imports replace the active timeline wholesale and reject
//! malformed input without touching it.

use crate::{Snapshot, SnapshotId, Timeline, TimelineError, TimelineResult};
use reviz_protocol::ExportScope;

/// Conventional file name for a bulk timeline export.
pub const TIMELINE_EXPORT_FILE: &str = "timeline-export.json";

/// Conventional file name for a single-snapshot SVG export.
pub fn preview_export_file(id: &SnapshotId) -> String {
    format!("{id}.svg")
}

/// Select the snapshots an export scope covers, in timeline order.
pub fn export_range(timeline: &Timeline, scope: &ExportScope) -> Vec<Snapshot> {
    let snapshots = timeline.snapshots();
    match scope {
        ExportScope::All => snapshots.to_vec(),
        ExportScope::Last { count } => {
            let count = ExportScope::effective_count(*count);
            let start = snapshots.len().saturating_sub(count);
            snapshots[start..].to_vec()
        }
    }
}

/// Serialize an export scope of the timeline as pretty-printed JSON.
pub fn export_json(timeline: &Timeline, scope: &ExportScope) -> TimelineResult<String> {
    let snapshots = export_range(timeline, scope);
    Ok(serde_json::to_string_pretty(&snapshots)?)
}

/// Parse a serialized snapshot array back into a timeline.
///
/// Malformed input (bad JSON, non-sequence ids, unordered ids) fails with
/// [`TimelineError::Parse`]; the caller's timeline is only replaced on
/// success.
pub fn import_timeline(data: &str) -> TimelineResult<Timeline> {
    let snapshots: Vec<Snapshot> =
        serde_json::from_str(data).map_err(|e| TimelineError::parse(e.to_string()))?;
    Timeline::from_snapshots(snapshots)
}
