//! Workspace-side signals consumed by the engine.

use serde::{Deserialize, Serialize};

/// Notification that a model resource changed on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// URI of the affected resource.
    pub uri: String,
    /// What happened to it.
    pub kind: ChangeKind,
}

/// Kind of resource change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// An existing resource was saved/modified.
    Changed,
    /// A new resource appeared.
    Created,
}

/// Connection lifecycle signals from the host's client manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionEvent {
    /// A different editing client became active; its document's timeline
    /// should be (re)loaded.
    ActiveClientChanged { document_id: String },
    /// The active client went away (editor closed, focus lost for good).
    NoActiveClient,
    /// The connection to the editing client dropped entirely.
    NoConnection,
}
