//! Resource change sources.
//!
//! The engine consumes resource changes only through [`ChangeSource`], a
//! restartable stream of [`ResourceChange`] events. [`FsChangeSource`] is
//! the bundled implementation: a notify-based filesystem watcher scoped to
//! the model's resource extension (a UML host watches `**/*.uml`). Hosts
//! with their own watcher infrastructure implement the trait directly.

use crate::error::CoreResult;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use reviz_protocol::{ChangeKind, ResourceChange};
use reviz_util::path;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Channel capacity for change events.
const CHANNEL_CAPACITY: usize = 100;

/// A restartable stream of resource change events.
pub trait ChangeSource: Send + Sync {
    /// Subscribe to the change event stream. Each subscriber sees every
    /// event from the moment of subscription.
    fn subscribe(&self) -> broadcast::Receiver<ResourceChange>;
}

/// Filesystem-backed change source.
///
/// Watches a root directory recursively and emits a [`ResourceChange`] for
/// every created or modified file carrying the model resource extension.
pub struct FsChangeSource {
    sender: broadcast::Sender<ResourceChange>,
}

impl FsChangeSource {
    /// Start watching `root` for changes to `*.{extension}` files.
    pub fn new(root: &Path, extension: &str) -> CoreResult<Self> {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        let tx = sender.clone();
        let (event_tx, event_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let _ = event_tx.send(result);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        info!(root = %root.display(), extension, "Watching model resources");

        let extension = extension.to_string();
        std::thread::Builder::new()
            .name("reviz-watcher".to_string())
            .spawn(move || {
                // The watcher must stay alive for the lifetime of this thread
                let _watcher = watcher;

                while let Ok(result) = event_rx.recv() {
                    match result {
                        Ok(event) => {
                            let Some(kind) = map_event_kind(&event.kind) else {
                                continue;
                            };
                            for file in &event.paths {
                                if !path::has_extension(file, &extension) {
                                    continue;
                                }

                                let change = ResourceChange {
                                    uri: path::resource_uri(file),
                                    kind,
                                };
                                debug!(uri = %change.uri, ?kind, "Resource change detected");

                                if tx.send(change).is_err() {
                                    debug!("No subscribers for resource changes");
                                }
                            }
                        }
                        Err(e) => warn!(error = %e, "File watch error"),
                    }
                }
                debug!("Watcher channel closed, stopping watcher thread");
            })?;

        Ok(Self { sender })
    }
}

impl ChangeSource for FsChangeSource {
    fn subscribe(&self) -> broadcast::Receiver<ResourceChange> {
        self.sender.subscribe()
    }
}

/// Map a notify event kind onto the wire-level change kind. Removals and
/// metadata-only events are not interesting to the capture policy.
fn map_event_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        _ => None,
    }
}
