//! The per-document timeline: an ordered, append-only sequence of snapshots.

use crate::{Snapshot, SnapshotId, TimelineError, TimelineResult};
use serde::{Deserialize, Serialize};

/// Storage scope for a timeline, derived from the document's stable
/// identifier.
///
/// Keys are sanitized so they are safe as storage path components; two
/// distinct document ids always yield distinct keys of the form
/// `doc_<sanitized id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey(String);

impl DocumentKey {
    /// Derive the key for a document id.
    ///
    /// Dots are replaced too: file-backed storage derives its file extension
    /// from the key, so a dot in the key would let distinct ids collide.
    pub fn new(document_id: impl AsRef<str>) -> Self {
        let sanitized: String = document_id
            .as_ref()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self(format!("doc_{sanitized}"))
    }

    /// Get the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered sequence of snapshots, oldest first.
///
/// Ids are unique and strictly increasing. `next_seq` survives truncation so
/// a dropped id is never handed out again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    entries: Vec<Snapshot>,
    #[serde(default)]
    next_seq: u64,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a timeline from imported snapshots.
    ///
    /// Validates the ordering invariant: every id must be a sequence number
    /// and ids must be strictly increasing.
    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> TimelineResult<Self> {
        let mut last_seq: Option<u64> = None;
        for snapshot in &snapshots {
            let seq = snapshot.id.seq().ok_or_else(|| {
                TimelineError::parse(format!("snapshot id is not a sequence number: {}", snapshot.id))
            })?;
            if last_seq.is_some_and(|last| seq <= last) {
                return Err(TimelineError::parse(format!(
                    "snapshot ids are not strictly increasing at {}",
                    snapshot.id
                )));
            }
            last_seq = Some(seq);
        }

        Ok(Self {
            next_seq: last_seq.map_or(0, |s| s + 1),
            entries: snapshots,
        })
    }

    /// The id the next appended snapshot will carry.
    pub fn next_id(&self) -> SnapshotId {
        SnapshotId::from_seq(self.next_seq)
    }

    /// Append a snapshot and advance the sequence counter past its id.
    pub fn append(&mut self, snapshot: Snapshot) {
        if let Some(seq) = snapshot.id.seq() {
            self.next_seq = self.next_seq.max(seq + 1);
        }
        self.entries.push(snapshot);
    }

    /// Find a snapshot by id.
    pub fn get(&self, id: &SnapshotId) -> Option<&Snapshot> {
        self.entries.iter().find(|s| &s.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &SnapshotId) -> Option<&mut Snapshot> {
        self.entries.iter_mut().find(|s| &s.id == id)
    }

    /// Index of a snapshot within the timeline.
    pub fn position(&self, id: &SnapshotId) -> Option<usize> {
        self.entries.iter().position(|s| &s.id == id)
    }

    /// Drop every snapshot after `id`, keeping the closed prefix ending at
    /// it. Returns `false` (and leaves the timeline untouched) if the id is
    /// unknown. The sequence counter is not rewound.
    pub fn truncate_after(&mut self, id: &SnapshotId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.truncate(index + 1);
                true
            }
            None => false,
        }
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.entries
    }

    /// Iterate over snapshots, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.entries.iter()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no snapshots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timeline: &Timeline, content: &str) -> Snapshot {
        Snapshot::new(
            timeline.next_id(),
            "File saved",
            vec![crate::ResourceSnapshot {
                uri: "file:///work/diagram.uml".to_string(),
                content: content.to_string(),
            }],
        )
    }

    #[test]
    fn test_document_key_sanitizes() {
        let key = DocumentKey::new("file:///work/My Model.uml");
        assert_eq!(key.as_str(), "doc_file____work_My_Model_uml");
    }

    #[test]
    fn test_document_keys_distinct() {
        assert_ne!(DocumentKey::new("model-a"), DocumentKey::new("model-b"));
        // Extensions must not collapse into the same storage key
        assert_ne!(DocumentKey::new("m.uml"), DocumentKey::new("m.xml"));
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut timeline = Timeline::new();
        for i in 0..3 {
            let s = snapshot(&timeline, &format!("v{i}"));
            timeline.append(s);
        }

        let ids: Vec<&str> = timeline.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "2"]);
        assert_eq!(timeline.next_id().as_str(), "3");
    }

    #[test]
    fn test_truncate_after_keeps_closed_prefix() {
        let mut timeline = Timeline::new();
        for i in 0..4 {
            let s = snapshot(&timeline, &format!("v{i}"));
            timeline.append(s);
        }

        assert!(timeline.truncate_after(&SnapshotId::from_seq(1)));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.latest().unwrap().id.as_str(), "1");
    }

    #[test]
    fn test_truncate_after_unknown_id_is_noop() {
        let mut timeline = Timeline::new();
        let s = snapshot(&timeline, "v0");
        timeline.append(s);

        assert!(!timeline.truncate_after(&SnapshotId::from_seq(9)));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_dropped_ids_are_never_reused() {
        let mut timeline = Timeline::new();
        for i in 0..4 {
            let s = snapshot(&timeline, &format!("v{i}"));
            timeline.append(s);
        }

        timeline.truncate_after(&SnapshotId::from_seq(1));

        // The next capture continues the sequence instead of recycling "2"
        assert_eq!(timeline.next_id().as_str(), "4");
        let s = snapshot(&timeline, "after restore");
        timeline.append(s);
        assert_eq!(timeline.latest().unwrap().id.as_str(), "4");
    }

    #[test]
    fn test_from_snapshots_restores_counter() {
        let mut source = Timeline::new();
        for i in 0..3 {
            let s = snapshot(&source, &format!("v{i}"));
            source.append(s);
        }

        let rebuilt = Timeline::from_snapshots(source.snapshots().to_vec()).unwrap();
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.next_id().as_str(), "3");
    }

    #[test]
    fn test_from_snapshots_rejects_unordered_ids() {
        let a = Snapshot::new(SnapshotId::from_seq(2), "File saved", vec![]);
        let b = Snapshot::new(SnapshotId::from_seq(1), "File saved", vec![]);

        let err = Timeline::from_snapshots(vec![a, b]).unwrap_err();
        assert!(matches!(err, TimelineError::Parse(_)));
    }

    #[test]
    fn test_from_snapshots_rejects_non_numeric_ids() {
        let a = Snapshot::new(SnapshotId::from_string("first"), "File saved", vec![]);

        let err = Timeline::from_snapshots(vec![a]).unwrap_err();
        assert!(matches!(err, TimelineError::Parse(_)));
    }
}
