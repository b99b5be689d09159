//! The persistent timeline store.
//!
//! [`TimelineStore`] owns the in-memory timeline of the active document and
//! writes it back through a [`TimelineRepository`] after every mutation.
//! Persistence is deliberately forgiving: a failed write is logged and the
//! in-memory state kept (last-writer-wins, no rollback), and loading a key
//! that was never written simply yields an empty timeline.

use crate::{DocumentKey, Snapshot, SnapshotId, Timeline, TimelineResult};
use async_trait::async_trait;
use reviz_protocol::Bounds;
use reviz_storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage namespace for persisted timelines.
pub const TIMELINE_NAMESPACE: &str = "timeline";

/// Persistence interface for timelines.
///
/// The engine never touches a concrete storage API; hosts hand in whatever
/// implements this. Every [`Storage`] backend implements it for free.
#[async_trait]
pub trait TimelineRepository: Send + Sync {
    /// Load the persisted timeline for a document key, if any.
    async fn load(&self, key: &DocumentKey) -> TimelineResult<Option<Timeline>>;

    /// Persist the full timeline under a document key.
    async fn save(&self, key: &DocumentKey, timeline: &Timeline) -> TimelineResult<()>;
}

#[async_trait]
impl<S: Storage> TimelineRepository for S {
    async fn load(&self, key: &DocumentKey) -> TimelineResult<Option<Timeline>> {
        Ok(self.read(&[TIMELINE_NAMESPACE, key.as_str()]).await?)
    }

    async fn save(&self, key: &DocumentKey, timeline: &Timeline) -> TimelineResult<()> {
        Ok(self
            .write(&[TIMELINE_NAMESPACE, key.as_str()], timeline)
            .await?)
    }
}

/// In-memory timeline of the active document, persisted on every mutation.
pub struct TimelineStore {
    repository: Arc<dyn TimelineRepository>,
    key: DocumentKey,
    timeline: Timeline,
}

impl TimelineStore {
    /// Load the timeline for a document key.
    ///
    /// Absent data yields an empty timeline; a failed read is logged and
    /// treated the same way. This never fails fatally.
    pub async fn load(repository: Arc<dyn TimelineRepository>, key: DocumentKey) -> Self {
        let timeline = match repository.load(&key).await {
            Ok(Some(timeline)) => {
                debug!(key = %key, entries = timeline.len(), "Loaded timeline");
                timeline
            }
            Ok(None) => Timeline::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load timeline, starting empty");
                Timeline::new()
            }
        };

        Self {
            repository,
            key,
            timeline,
        }
    }

    /// The document key this store is scoped to.
    pub fn document_key(&self) -> &DocumentKey {
        &self.key
    }

    /// Read-only view of the timeline for display/export.
    pub fn current(&self) -> &Timeline {
        &self.timeline
    }

    /// The id the next appended snapshot will carry.
    pub fn next_id(&self) -> SnapshotId {
        self.timeline.next_id()
    }

    /// Append a snapshot and persist. Returns the appended snapshot's id.
    pub async fn append(&mut self, snapshot: Snapshot) -> SnapshotId {
        let id = snapshot.id.clone();
        self.timeline.append(snapshot);
        self.persist().await;
        id
    }

    /// Truncate the timeline to the closed prefix ending at `id` and
    /// persist. Returns `false` if the id is unknown (nothing changes).
    pub async fn truncate_after(&mut self, id: &SnapshotId) -> bool {
        if !self.timeline.truncate_after(id) {
            return false;
        }
        self.persist().await;
        true
    }

    /// Rename a snapshot's label and persist. Returns `false` if the id is
    /// unknown.
    pub async fn update_message(&mut self, id: &SnapshotId, message: &str) -> bool {
        let Some(snapshot) = self.timeline.get_mut(id) else {
            return false;
        };
        snapshot.message = message.to_string();
        self.persist().await;
        true
    }

    /// Attach a rendered preview to a snapshot and persist.
    ///
    /// Returns `false` if the id is unknown or the snapshot already carries a
    /// preview (the fill is one-time).
    pub async fn attach_preview(&mut self, id: &SnapshotId, svg: String, bounds: Bounds) -> bool {
        let Some(snapshot) = self.timeline.get_mut(id) else {
            return false;
        };
        if !snapshot.attach_preview(svg, bounds) {
            warn!(id = %id, "Preview already attached, ignoring");
            return false;
        }
        self.persist().await;
        true
    }

    /// Replace the timeline wholesale (import) and persist.
    pub async fn replace(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.persist().await;
    }

    /// Write the full timeline back under the document key. Failure is
    /// logged; the in-memory state is kept either way.
    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.key, &self.timeline).await {
            warn!(key = %self.key, error = %e, "Failed to persist timeline");
        }
    }
}
