//! Snapshot data structures.

use chrono::{DateTime, Utc};
use reviz_protocol::Bounds;
use serde::{Deserialize, Serialize};

/// Identifier of a snapshot within a timeline.
///
/// The wire value is a decimal sequence number rendered as a string ("0",
/// "1", ...). Ids are unique and strictly increasing within one timeline and
/// a dropped id is never reused, so they double as the restore/correlation
/// key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    /// Create a snapshot id from a sequence number.
    pub fn from_seq(seq: u64) -> Self {
        Self(seq.to_string())
    }

    /// Create a snapshot id from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sequence number behind this id, if it parses as one.
    pub fn seq(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full text content of one document resource at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// URI of the resource.
    pub uri: String,
    /// Serialized content at capture time.
    pub content: String,
}

/// Rendered preview attached to a snapshot after the render round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// SVG markup of the diagram.
    pub svg: String,
    /// Bounding box of the rendered content.
    pub bounds: Bounds,
}

/// One timeline entry: the state of a document at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identifier, unique within the timeline.
    pub id: SnapshotId,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Short human label, e.g. "File saved".
    pub message: String,

    /// Contents of every affected resource at capture time.
    pub resources: Vec<ResourceSnapshot>,

    /// Rendered preview; filled in asynchronously after capture and absent
    /// if the render response never arrives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

impl Snapshot {
    /// Create a new snapshot without a preview.
    pub fn new(
        id: SnapshotId,
        message: impl Into<String>,
        resources: Vec<ResourceSnapshot>,
    ) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            message: message.into(),
            resources,
            preview: None,
        }
    }

    /// Whether the render round trip for this snapshot completed.
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Attach the rendered preview. The fill is one-time: a second attempt is
    /// rejected and returns `false`.
    pub fn attach_preview(&mut self, svg: impl Into<String>, bounds: Bounds) -> bool {
        if self.preview.is_some() {
            return false;
        }
        self.preview = Some(Preview {
            svg: svg.into(),
            bounds,
        });
        true
    }

    /// Whether this snapshot captured exactly the given resource contents.
    pub fn same_resources(&self, resources: &[ResourceSnapshot]) -> bool {
        self.resources == resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(uri: &str, content: &str) -> ResourceSnapshot {
        ResourceSnapshot {
            uri: uri.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_snapshot_id_seq() {
        assert_eq!(SnapshotId::from_seq(7).as_str(), "7");
        assert_eq!(SnapshotId::from_seq(7).seq(), Some(7));
        assert_eq!(SnapshotId::from_string("abc").seq(), None);
    }

    #[test]
    fn test_snapshot_id_serializes_as_string() {
        let json = serde_json::to_string(&SnapshotId::from_seq(3)).unwrap();
        assert_eq!(json, "\"3\"");
    }

    #[test]
    fn test_attach_preview_is_one_time() {
        let mut snapshot = Snapshot::new(
            SnapshotId::from_seq(0),
            "File saved",
            vec![resource("file:///work/diagram.uml", "<uml/>")],
        );
        assert!(!snapshot.has_preview());

        assert!(snapshot.attach_preview("<svg/>", Bounds::default()));
        assert!(snapshot.has_preview());

        // Second fill is rejected and the first preview kept
        assert!(!snapshot.attach_preview("<other/>", Bounds::default()));
        assert_eq!(snapshot.preview.as_ref().unwrap().svg, "<svg/>");
    }

    #[test]
    fn test_same_resources() {
        let contents = vec![resource("file:///work/diagram.uml", "<uml/>")];
        let snapshot = Snapshot::new(SnapshotId::from_seq(0), "File saved", contents.clone());

        assert!(snapshot.same_resources(&contents));
        assert!(!snapshot.same_resources(&[resource("file:///work/diagram.uml", "<uml v2/>")]));
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let mut snapshot = Snapshot::new(
            SnapshotId::from_seq(1),
            "File saved",
            vec![resource("file:///work/diagram.uml", "<uml/>")],
        );
        snapshot.attach_preview(
            "<svg/>",
            Bounds {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_preview_omitted_when_absent() {
        let snapshot = Snapshot::new(SnapshotId::from_seq(0), "File saved", vec![]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("preview"));
    }
}
