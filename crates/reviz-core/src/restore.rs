//! Restore execution.
//!
//! Restoring truncates the timeline to the chosen snapshot and writes that
//! snapshot's resource contents back to the live document. The outcome is
//! reported explicitly: `Restored`, `NotFound` (unknown id, nothing
//! changed), or `PartialWriteFailure` (timeline truncated but a resource
//! could not be written back).

use crate::bus::{Bus, RestoreCompleted, TimelineChanged};
use crate::document::ResourceWriter;
use crate::error::CoreResult;
use crate::session::DocumentSession;
use reviz_protocol::RestoreOutcome;
use reviz_timeline::SnapshotId;
use std::sync::Arc;
use tracing::{info, warn};

/// Executes restore requests against the active session.
pub struct RestoreExecutor {
    writer: Arc<dyn ResourceWriter>,
    bus: Bus,
}

impl RestoreExecutor {
    /// Create a new restore executor.
    pub fn new(writer: Arc<dyn ResourceWriter>, bus: Bus) -> Self {
        Self { writer, bus }
    }

    /// Restore the document to the state captured by `snapshot_id`.
    ///
    /// The completion acknowledgment (a [`RestoreCompleted`] event carrying
    /// `request_id`) is published in every case, including `NotFound`.
    pub async fn restore(
        &self,
        session: &mut DocumentSession,
        request_id: &str,
        snapshot_id: &SnapshotId,
    ) -> CoreResult<RestoreOutcome> {
        let Some(snapshot) = session.store.current().get(snapshot_id).cloned() else {
            info!(id = %snapshot_id, "Restore target not found, nothing to do");
            let outcome = RestoreOutcome::NotFound;
            self.acknowledge(request_id, &outcome).await;
            return Ok(outcome);
        };

        info!(
            id = %snapshot_id,
            resources = snapshot.resources.len(),
            "Restoring snapshot"
        );

        // Drop everything after the restore point, then persist
        session.store.truncate_after(snapshot_id).await;

        // Write the captured contents back to the live document. All
        // resources are attempted; the first failure is what gets reported.
        let mut failed_uri: Option<String> = None;
        for resource in &snapshot.resources {
            if let Err(e) = self
                .writer
                .write_resource(&resource.uri, &resource.content)
                .await
            {
                warn!(uri = %resource.uri, error = %e, "Failed to write resource back");
                if failed_uri.is_none() {
                    failed_uri = Some(resource.uri.clone());
                }
            }
        }

        let outcome = match failed_uri {
            Some(uri) => RestoreOutcome::PartialWriteFailure { uri },
            None => RestoreOutcome::Restored {
                snapshot_id: snapshot_id.to_string(),
            },
        };

        self.bus
            .publish(TimelineChanged {
                document_key: session.document_key().to_string(),
                snapshots: session.timeline().snapshots().to_vec(),
            })
            .await;
        self.acknowledge(request_id, &outcome).await;

        Ok(outcome)
    }

    async fn acknowledge(&self, request_id: &str, outcome: &RestoreOutcome) {
        self.bus
            .publish(RestoreCompleted {
                request_id: request_id.to_string(),
                outcome: outcome.clone(),
            })
            .await;
    }
}
