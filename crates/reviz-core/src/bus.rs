//! Event bus for engine-to-host notifications.
//!
//! The bus provides a publish/subscribe mechanism so the host UI can observe
//! timeline mutations without coupling to the components that cause them.
//! Events are typed; wildcard subscribers receive every event as JSON.
//!
//! # Example
//!
//! ```ignore
//! let bus = Bus::new();
//!
//! let mut rx = bus.subscribe::<TimelineChanged>().await;
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         println!("timeline now has {} snapshots", event.snapshots.len());
//!     }
//! });
//! ```

use reviz_protocol::{Bounds, RestoreOutcome};
use reviz_timeline::Snapshot;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 256;

/// Trait for events that can be published on the bus.
pub trait Event: Clone + Send + Sync + 'static {
    /// Event type name for serialization/logging.
    fn event_type() -> &'static str;
}

/// The event bus for pub/sub communication.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

struct BusInner {
    /// Typed channels by TypeId.
    channels: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    /// Wildcard subscribers (receive all events as JSON).
    wildcard: broadcast::Sender<BusEvent>,
}

/// A serialized event for wildcard subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    /// Event type name.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload as JSON.
    pub payload: serde_json::Value,
}

impl Bus {
    /// Create a new event bus.
    pub fn new() -> Self {
        let (wildcard, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            inner: Arc::new(BusInner {
                channels: RwLock::new(HashMap::new()),
                wildcard,
            }),
        }
    }

    /// Publish an event to all subscribers.
    pub async fn publish<E: Event + Serialize>(&self, event: E) {
        let type_id = TypeId::of::<E>();

        // Send to typed subscribers
        let channels = self.inner.channels.read().await;
        if let Some(sender) = channels.get(&type_id) {
            if let Some(tx) = sender.downcast_ref::<broadcast::Sender<E>>() {
                // Ignore send errors (no receivers)
                let _ = tx.send(event.clone());
            }
        }
        drop(channels);

        // Send to wildcard subscribers
        if let Ok(payload) = serde_json::to_value(&event) {
            let bus_event = BusEvent {
                event_type: E::event_type().to_string(),
                payload,
            };
            let _ = self.inner.wildcard.send(bus_event);
        }
    }

    /// Subscribe to events of type E.
    pub async fn subscribe<E: Event>(&self) -> broadcast::Receiver<E> {
        let type_id = TypeId::of::<E>();

        // Check if channel exists
        {
            let channels = self.inner.channels.read().await;
            if let Some(sender) = channels.get(&type_id) {
                if let Some(tx) = sender.downcast_ref::<broadcast::Sender<E>>() {
                    return tx.subscribe();
                }
            }
        }

        // Create new channel
        let mut channels = self.inner.channels.write().await;
        let (tx, rx) = broadcast::channel::<E>(DEFAULT_CAPACITY);
        channels.insert(type_id, Box::new(tx));
        rx
    }

    /// Subscribe to all events (wildcard).
    pub fn subscribe_all(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.wildcard.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Event Types
// ============================================================================

/// The active timeline changed (capture, preview fill, rename, restore,
/// import, or session swap). Pushed after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineChanged {
    pub document_key: String,
    pub snapshots: Vec<Snapshot>,
}

impl Event for TimelineChanged {
    fn event_type() -> &'static str {
        "timeline.changed"
    }
}

/// A snapshot was appended to the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCaptured {
    pub document_key: String,
    pub snapshot_id: String,
}

impl Event for SnapshotCaptured {
    fn event_type() -> &'static str {
        "snapshot.captured"
    }
}

/// A render response arrived and its preview was attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewAttached {
    pub document_key: String,
    pub snapshot_id: String,
}

impl Event for PreviewAttached {
    fn event_type() -> &'static str {
        "snapshot.preview_attached"
    }
}

/// A restore request finished.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreCompleted {
    pub request_id: String,
    pub outcome: RestoreOutcome,
}

impl Event for RestoreCompleted {
    fn event_type() -> &'static str {
        "restore.completed"
    }
}

/// A document session was opened and its timeline loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionActivated {
    pub document_key: String,
}

impl Event for SessionActivated {
    fn event_type() -> &'static str {
        "session.activated"
    }
}

/// The active document session was closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosed {
    pub document_key: String,
}

impl Event for SessionClosed {
    fn event_type() -> &'static str {
        "session.closed"
    }
}

/// A one-off render (explicit export trigger) completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewExportReady {
    pub correlation_id: String,
    pub svg: String,
    pub bounds: Bounds,
}

impl Event for PreviewExportReady {
    fn event_type() -> &'static str {
        "preview.export_ready"
    }
}
