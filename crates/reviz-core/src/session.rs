//! Document sessions and their lifecycle.
//!
//! A [`DocumentSession`] bundles everything that is scoped to one active
//! document: its key, its timeline store, and the pending capture state. It
//! is constructed when a client connects and dropped when it disconnects —
//! never partially reset — so stale pending correlations cannot leak across
//! documents.

use crate::bus::{Bus, SessionActivated, SessionClosed, TimelineChanged};
use reviz_timeline::{DocumentKey, SnapshotId, Timeline, TimelineRepository, TimelineStore};
use reviz_protocol::ConnectionEvent;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Capture state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No render round trip is outstanding.
    Idle,
    /// At least one appended snapshot is waiting for its preview.
    AwaitingPreview,
}

/// Everything scoped to the active document.
pub struct DocumentSession {
    pub(crate) store: TimelineStore,
    /// Correlation id -> snapshot awaiting its preview.
    pub(crate) pending_previews: HashMap<String, SnapshotId>,
    /// Correlation ids of one-off export renders (no timeline entry).
    pub(crate) pending_exports: HashSet<String>,
    /// Time of the last successful capture, for debouncing.
    pub(crate) last_capture: Option<Instant>,
}

impl DocumentSession {
    /// Open the session for a document, loading its persisted timeline.
    pub async fn open(repository: Arc<dyn TimelineRepository>, document_id: &str) -> Self {
        let key = DocumentKey::new(document_id);
        let store = TimelineStore::load(repository, key).await;
        Self {
            store,
            pending_previews: HashMap::new(),
            pending_exports: HashSet::new(),
            last_capture: None,
        }
    }

    /// The key this session's timeline is persisted under.
    pub fn document_key(&self) -> &DocumentKey {
        self.store.document_key()
    }

    /// Read-only view of the session's timeline.
    pub fn timeline(&self) -> &Timeline {
        self.store.current()
    }

    /// Current capture state, derived from the pending map.
    pub fn capture_state(&self) -> CaptureState {
        if self.pending_previews.is_empty() {
            CaptureState::Idle
        } else {
            CaptureState::AwaitingPreview
        }
    }
}

/// Owns the active [`DocumentSession`] and reacts to connection lifecycle
/// signals. At most one session is active at a time.
pub struct SessionManager {
    repository: Arc<dyn TimelineRepository>,
    bus: Bus,
    active: Option<DocumentSession>,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(repository: Arc<dyn TimelineRepository>, bus: Bus) -> Self {
        Self {
            repository,
            bus,
            active: None,
        }
    }

    /// The active session, if a client is connected.
    pub fn active(&self) -> Option<&DocumentSession> {
        self.active.as_ref()
    }

    /// Mutable access to the active session.
    pub fn active_mut(&mut self) -> Option<&mut DocumentSession> {
        self.active.as_mut()
    }

    /// Open a session for `document_id`, replacing any previous one.
    pub async fn activate(&mut self, document_id: &str) {
        self.close_active().await;

        let session = DocumentSession::open(self.repository.clone(), document_id).await;
        info!(key = %session.document_key(), "Document session activated");

        self.bus
            .publish(SessionActivated {
                document_key: session.document_key().to_string(),
            })
            .await;
        self.bus
            .publish(TimelineChanged {
                document_key: session.document_key().to_string(),
                snapshots: session.timeline().snapshots().to_vec(),
            })
            .await;

        self.active = Some(session);
    }

    /// Drop the active session. The persisted timeline is kept.
    pub async fn deactivate(&mut self) {
        self.close_active().await;
    }

    /// React to a connection lifecycle signal.
    pub async fn handle_connection(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::ActiveClientChanged { document_id } => {
                self.activate(&document_id).await;
            }
            ConnectionEvent::NoActiveClient | ConnectionEvent::NoConnection => {
                self.deactivate().await;
            }
        }
    }

    async fn close_active(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };
        let key = session.document_key().to_string();
        debug!(key = %key, "Document session closed");

        self.bus.publish(SessionClosed { document_key: key.clone() }).await;
        // Observers see an empty timeline until the next activation
        self.bus
            .publish(TimelineChanged {
                document_key: key,
                snapshots: vec![],
            })
            .await;
    }
}
