//! Capture coordination.
//!
//! The coordinator turns "resource changed" signals into timeline entries
//! and correlates asynchronous render responses back to the snapshot that
//! requested them. Per session it runs a small state machine: `Idle` until a
//! capture issues a render request, `AwaitingPreview` until the matching
//! response arrives.
//!
//! Trigger policy:
//! - signals inside the debounce interval of the last capture are dropped,
//! - signals for resources that don't belong to the active document are
//!   dropped,
//! - captures whose resource contents are byte-identical to the latest
//!   snapshot are dropped (dedup applies at capture time only; an identical
//!   preview arriving later is still attached).

use crate::bus::{Bus, PreviewAttached, PreviewExportReady, SnapshotCaptured, TimelineChanged};
use crate::config::CaptureConfig;
use crate::document::DocumentModel;
use crate::error::CoreResult;
use crate::render::RenderService;
use crate::session::DocumentSession;
use reviz_protocol::{RenderRequest, RenderResponse, ResourceChange};
use reviz_timeline::{ResourceSnapshot, Snapshot, SnapshotId};
use reviz_util::{path, Identifier};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Coordinates captures and render round trips for the active session.
pub struct CaptureCoordinator {
    config: CaptureConfig,
    renderer: Arc<dyn RenderService>,
    bus: Bus,
}

impl CaptureCoordinator {
    /// Create a new capture coordinator.
    pub fn new(config: CaptureConfig, renderer: Arc<dyn RenderService>, bus: Bus) -> Self {
        Self {
            config,
            renderer,
            bus,
        }
    }

    /// Handle a "resource changed" signal for the active document.
    ///
    /// Returns the id of the appended snapshot, or `None` if the signal was
    /// dropped by policy (disabled, debounced, foreign resource, unchanged
    /// contents).
    pub async fn handle_resource_change(
        &self,
        session: &mut DocumentSession,
        model: &dyn DocumentModel,
        change: &ResourceChange,
    ) -> CoreResult<Option<SnapshotId>> {
        if !self.config.enabled {
            debug!("Captures disabled, dropping change signal");
            return Ok(None);
        }

        // Debounce: drop signals arriving too soon after the last capture
        if let Some(last) = session.last_capture {
            if last.elapsed() < self.config.debounce() {
                debug!(uri = %change.uri, "Change signal debounced");
                return Ok(None);
            }
        }

        let resources = model.resources().await?;

        // The changed resource must belong to the active document
        if !resources
            .iter()
            .any(|r| path::same_resource(&r.uri, &change.uri))
        {
            debug!(uri = %change.uri, "Change signal for foreign resource, dropping");
            return Ok(None);
        }

        let contents: Vec<ResourceSnapshot> = resources
            .into_iter()
            .map(|r| ResourceSnapshot {
                uri: r.uri,
                content: r.content,
            })
            .collect();

        // Dedup at capture time: identical contents produce no new entry
        if session
            .store
            .current()
            .latest()
            .is_some_and(|s| s.same_resources(&contents))
        {
            debug!(uri = %change.uri, "Contents unchanged since last snapshot, dropping");
            return Ok(None);
        }

        if !session.pending_previews.is_empty() {
            // Policy targets one render round trip in flight; the pending map
            // keeps the earlier request resolvable regardless.
            warn!(
                pending = session.pending_previews.len(),
                "Capturing while a render response is still outstanding"
            );
        }

        let snapshot = Snapshot::new(
            session.store.next_id(),
            self.config.capture_message.clone(),
            contents,
        );
        let snapshot_id = session.store.append(snapshot).await;
        session.last_capture = Some(Instant::now());

        let correlation_id = Identifier::correlation();
        session
            .pending_previews
            .insert(correlation_id.clone(), snapshot_id.clone());

        if let Err(e) = self
            .renderer
            .request_render(RenderRequest {
                correlation_id: correlation_id.clone(),
            })
            .await
        {
            // The snapshot stays, just without a preview
            warn!(error = %e, "Render request failed");
            session.pending_previews.remove(&correlation_id);
        }

        let document_key = session.document_key().to_string();
        self.bus
            .publish(SnapshotCaptured {
                document_key: document_key.clone(),
                snapshot_id: snapshot_id.to_string(),
            })
            .await;
        self.publish_timeline(session).await;

        Ok(Some(snapshot_id))
    }

    /// Handle an asynchronous render response.
    ///
    /// Matching is by correlation id equality only. A response that matches a
    /// pending capture fills that snapshot's preview; one that matches a
    /// pending export is surfaced as [`PreviewExportReady`]; anything else is
    /// ignored without mutating any snapshot. Returns whether the response
    /// was consumed.
    pub async fn handle_render_response(
        &self,
        session: &mut DocumentSession,
        response: RenderResponse,
    ) -> CoreResult<bool> {
        if let Some(snapshot_id) = session.pending_previews.remove(&response.correlation_id) {
            let attached = session
                .store
                .attach_preview(&snapshot_id, response.svg, response.bounds)
                .await;
            if !attached {
                // The snapshot was truncated away while the render was in
                // flight; the response is simply stale.
                debug!(id = %snapshot_id, "Pending snapshot gone, dropping preview");
                return Ok(false);
            }

            self.bus
                .publish(PreviewAttached {
                    document_key: session.document_key().to_string(),
                    snapshot_id: snapshot_id.to_string(),
                })
                .await;
            self.publish_timeline(session).await;
            return Ok(true);
        }

        if session.pending_exports.remove(&response.correlation_id) {
            self.bus
                .publish(PreviewExportReady {
                    correlation_id: response.correlation_id,
                    svg: response.svg,
                    bounds: response.bounds,
                })
                .await;
            return Ok(true);
        }

        debug!(correlation_id = %response.correlation_id, "Unmatched render response, ignoring");
        Ok(false)
    }

    /// Request a one-off render for an explicit export trigger.
    ///
    /// No timeline entry is appended; the correlated response surfaces as
    /// [`PreviewExportReady`]. Returns the correlation id.
    pub async fn request_export_render(
        &self,
        session: &mut DocumentSession,
    ) -> CoreResult<String> {
        let correlation_id = Identifier::correlation();
        session.pending_exports.insert(correlation_id.clone());

        if let Err(e) = self
            .renderer
            .request_render(RenderRequest {
                correlation_id: correlation_id.clone(),
            })
            .await
        {
            session.pending_exports.remove(&correlation_id);
            return Err(e);
        }

        Ok(correlation_id)
    }

    async fn publish_timeline(&self, session: &DocumentSession) {
        self.bus
            .publish(TimelineChanged {
                document_key: session.document_key().to_string(),
                snapshots: session.timeline().snapshots().to_vec(),
            })
            .await;
    }
}
