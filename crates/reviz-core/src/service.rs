//! The revision service facade.
//!
//! [`RevisionService`] is what a host embeds. It owns the session manager,
//! capture coordinator and restore executor behind one lock (operations run
//! to completion in signal order, matching the single-threaded event model
//! of the editors it serves) and exposes the command-style entry points the
//! host UI calls, plus the inbound signal handlers for resource changes,
//! render responses and connection lifecycle events.

use crate::bus::{Bus, TimelineChanged};
use crate::capture::CaptureCoordinator;
use crate::config::CaptureConfig;
use crate::document::{DocumentModel, ResourceWriter};
use crate::error::{CoreError, CoreResult};
use crate::render::RenderService;
use crate::restore::RestoreExecutor;
use crate::session::SessionManager;
use reviz_protocol::{
    Action, ConnectionEvent, ExportScope, RenderResponse, ResourceChange, RestoreOutcome,
    SnapshotInfo, Update,
};
use reviz_timeline::{codec, Snapshot, SnapshotId, Timeline, TimelineError, TimelineRepository};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

struct ServiceState {
    sessions: SessionManager,
    coordinator: CaptureCoordinator,
    restore: RestoreExecutor,
    /// Accessor for the live document, tracked via model-state signals.
    model: Option<Arc<dyn DocumentModel>>,
}

/// Facade over the capture-and-restore engine for one host.
pub struct RevisionService {
    inner: Mutex<ServiceState>,
    bus: Bus,
}

impl RevisionService {
    /// Create a new revision service.
    pub fn new(
        repository: Arc<dyn TimelineRepository>,
        renderer: Arc<dyn RenderService>,
        writer: Arc<dyn ResourceWriter>,
        config: CaptureConfig,
    ) -> Self {
        let bus = Bus::new();
        Self {
            inner: Mutex::new(ServiceState {
                sessions: SessionManager::new(repository, bus.clone()),
                coordinator: CaptureCoordinator::new(config, renderer, bus.clone()),
                restore: RestoreExecutor::new(writer, bus.clone()),
                model: None,
            }),
            bus,
        }
    }

    /// The event bus carrying `TimelineChanged` and the other push
    /// notifications.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// React to a connection lifecycle signal from the host.
    pub async fn handle_connection(&self, event: ConnectionEvent) {
        let mut state = self.inner.lock().await;
        state.sessions.handle_connection(event).await;
    }

    /// Track the current document model accessor (None when no model state
    /// is loaded).
    pub async fn set_model(&self, model: Option<Arc<dyn DocumentModel>>) {
        let mut state = self.inner.lock().await;
        state.model = model;
    }

    /// Handle a "resource changed" signal from the workspace watcher.
    ///
    /// Returns the id of the captured snapshot, or `None` if the signal was
    /// dropped (no client, no model state, or capture policy).
    pub async fn handle_resource_change(
        &self,
        change: ResourceChange,
    ) -> CoreResult<Option<SnapshotId>> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        let Some(model) = state.model.clone() else {
            warn!(uri = %change.uri, "No model state loaded, skipping capture");
            return Ok(None);
        };
        let Some(session) = state.sessions.active_mut() else {
            warn!(uri = %change.uri, "No active editing client, dropping change signal");
            return Ok(None);
        };

        state
            .coordinator
            .handle_resource_change(session, model.as_ref(), &change)
            .await
    }

    /// Feed an asynchronous render response back into the engine.
    ///
    /// Returns whether the response matched a pending request.
    pub async fn handle_render_response(&self, response: RenderResponse) -> CoreResult<bool> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        let Some(session) = state.sessions.active_mut() else {
            warn!(
                correlation_id = %response.correlation_id,
                "Render response with no active session, ignoring"
            );
            return Ok(false);
        };

        state
            .coordinator
            .handle_render_response(session, response)
            .await
    }

    /// Export the active timeline (or its trailing entries) as JSON.
    pub async fn request_export(&self, scope: &ExportScope) -> CoreResult<Update> {
        let guard = self.inner.lock().await;
        let session = guard.sessions.active().ok_or(CoreError::NoActiveClient)?;

        let data = codec::export_json(session.timeline(), scope)?;
        Ok(Update::ExportReady {
            file_name: codec::TIMELINE_EXPORT_FILE.to_string(),
            data,
        })
    }

    /// Replace the active document's timeline with an imported one.
    ///
    /// Malformed input fails with a parse error and leaves the active
    /// timeline unchanged.
    pub async fn request_import(&self, data: &str) -> CoreResult<Update> {
        let imported = codec::import_timeline(data)?;

        let mut guard = self.inner.lock().await;
        let session = guard
            .sessions
            .active_mut()
            .ok_or(CoreError::NoActiveClient)?;

        session.store.replace(imported).await;
        let update = Update::TimelineChanged {
            snapshots: snapshot_infos(session.timeline()),
        };
        self.publish_timeline(session).await;
        Ok(update)
    }

    /// Restore the document to the state captured by `snapshot_id`.
    pub async fn request_restore(
        &self,
        request_id: &str,
        snapshot_id: &SnapshotId,
    ) -> CoreResult<RestoreOutcome> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        let session = state
            .sessions
            .active_mut()
            .ok_or(CoreError::NoActiveClient)?;

        state.restore.restore(session, request_id, snapshot_id).await
    }

    /// Rename a snapshot's label.
    pub async fn request_rename(
        &self,
        snapshot_id: &SnapshotId,
        message: &str,
    ) -> CoreResult<Update> {
        let mut guard = self.inner.lock().await;
        let session = guard
            .sessions
            .active_mut()
            .ok_or(CoreError::NoActiveClient)?;

        if !session.store.update_message(snapshot_id, message).await {
            return Err(TimelineError::not_found(snapshot_id.to_string()).into());
        }

        let update = Update::TimelineChanged {
            snapshots: snapshot_infos(session.timeline()),
        };
        self.publish_timeline(session).await;
        Ok(update)
    }

    /// Export the stored preview of a single snapshot as SVG.
    pub async fn export_preview(&self, snapshot_id: &SnapshotId) -> CoreResult<Update> {
        let guard = self.inner.lock().await;
        let session = guard.sessions.active().ok_or(CoreError::NoActiveClient)?;

        let snapshot = session
            .timeline()
            .get(snapshot_id)
            .ok_or_else(|| TimelineError::not_found(snapshot_id.to_string()))?;
        let preview = snapshot
            .preview
            .as_ref()
            .ok_or_else(|| CoreError::NoPreview(snapshot_id.to_string()))?;

        Ok(Update::PreviewReady {
            file_name: codec::preview_export_file(snapshot_id),
            svg: preview.svg.clone(),
        })
    }

    /// Request a one-off render of the current diagram (explicit export
    /// trigger). No timeline entry is appended; the result surfaces as a
    /// `PreviewExportReady` event. Returns the correlation id.
    pub async fn request_export_render(&self) -> CoreResult<String> {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        let session = state
            .sessions
            .active_mut()
            .ok_or(CoreError::NoActiveClient)?;

        state.coordinator.request_export_render(session).await
    }

    /// Dispatch a command-style action from the host UI.
    pub async fn dispatch(&self, action: Action) -> CoreResult<Update> {
        match action {
            Action::ExportTimeline { scope } => self.request_export(&scope).await,
            Action::ImportTimeline { data } => self.request_import(&data).await,
            Action::RestoreSnapshot {
                request_id,
                snapshot_id,
            } => {
                let outcome = self
                    .request_restore(&request_id, &SnapshotId::from_string(snapshot_id))
                    .await?;
                Ok(Update::RestoreCompleted {
                    request_id,
                    outcome,
                })
            }
            Action::RenameSnapshot {
                snapshot_id,
                message,
            } => {
                self.request_rename(&SnapshotId::from_string(snapshot_id), &message)
                    .await
            }
            Action::ExportPreview { snapshot_id } => {
                self.export_preview(&SnapshotId::from_string(snapshot_id))
                    .await
            }
        }
    }

    /// Current snapshots of the active timeline (empty when no session).
    pub async fn timeline_snapshot(&self) -> Vec<Snapshot> {
        let guard = self.inner.lock().await;
        guard
            .sessions
            .active()
            .map(|s| s.timeline().snapshots().to_vec())
            .unwrap_or_default()
    }

    async fn publish_timeline(&self, session: &crate::session::DocumentSession) {
        self.bus
            .publish(TimelineChanged {
                document_key: session.document_key().to_string(),
                snapshots: session.timeline().snapshots().to_vec(),
            })
            .await;
    }
}

fn snapshot_infos(timeline: &Timeline) -> Vec<SnapshotInfo> {
    timeline
        .iter()
        .map(|s| SnapshotInfo {
            id: s.id.to_string(),
            timestamp: s.timestamp.to_rfc3339(),
            message: s.message.clone(),
            has_preview: s.has_preview(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ModelResource;
    use async_trait::async_trait;
    use reviz_protocol::{Bounds, ChangeKind, RenderRequest};
    use reviz_storage::MemoryStorage;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct FakeModel {
        resources: StdMutex<Vec<ModelResource>>,
    }

    impl FakeModel {
        fn new(content: &str) -> Arc<Self> {
            Arc::new(Self {
                resources: StdMutex::new(vec![ModelResource {
                    uri: "file:///work/diagram.uml".to_string(),
                    content: content.to_string(),
                    format: "xml".to_string(),
                }]),
            })
        }

        fn set_content(&self, content: &str) {
            self.resources.lock().unwrap()[0].content = content.to_string();
        }
    }

    #[async_trait]
    impl DocumentModel for FakeModel {
        fn source_model_id(&self) -> String {
            "model-a".to_string()
        }

        async fn resources(&self) -> CoreResult<Vec<ModelResource>> {
            Ok(self.resources.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        requests: StdMutex<Vec<RenderRequest>>,
    }

    impl RecordingRenderer {
        fn last_correlation(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .expect("no render request issued")
                .correlation_id
                .clone()
        }
    }

    #[async_trait]
    impl RenderService for RecordingRenderer {
        async fn request_render(&self, request: RenderRequest) -> CoreResult<()> {
            self.requests.lock().unwrap().push(request);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryWriter {
        files: StdMutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl ResourceWriter for MemoryWriter {
        async fn write_resource(&self, uri: &str, content: &str) -> CoreResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(uri.to_string(), content.to_string());
            Ok(())
        }
    }

    struct Fixture {
        service: RevisionService,
        renderer: Arc<RecordingRenderer>,
        writer: Arc<MemoryWriter>,
        model: Arc<FakeModel>,
    }

    async fn fixture() -> Fixture {
        let renderer = Arc::new(RecordingRenderer::default());
        let writer = Arc::new(MemoryWriter::default());
        let model = FakeModel::new("<uml v0/>");

        let config = CaptureConfig {
            enabled: true,
            debounce_ms: 0,
            capture_message: "File saved".to_string(),
        };
        let service = RevisionService::new(
            Arc::new(MemoryStorage::new()),
            renderer.clone(),
            writer.clone(),
            config,
        );

        service
            .handle_connection(ConnectionEvent::ActiveClientChanged {
                document_id: "model-a".to_string(),
            })
            .await;
        service.set_model(Some(model.clone())).await;

        Fixture {
            service,
            renderer,
            writer,
            model,
        }
    }

    fn change() -> ResourceChange {
        ResourceChange {
            uri: "file:///work/diagram.uml".to_string(),
            kind: ChangeKind::Changed,
        }
    }

    fn response(correlation_id: &str) -> RenderResponse {
        RenderResponse {
            correlation_id: correlation_id.to_string(),
            svg: "<svg/>".to_string(),
            bounds: Bounds::default(),
        }
    }

    /// Capture `n` snapshots with distinct contents and completed previews.
    async fn capture(fx: &Fixture, n: usize) {
        for i in 0..n {
            fx.model.set_content(&format!("<uml v{i}/>"));
            let id = fx
                .service
                .handle_resource_change(change())
                .await
                .unwrap()
                .expect("capture was dropped");
            fx.service
                .handle_render_response(response(&fx.renderer.last_correlation()))
                .await
                .unwrap();
            assert_eq!(id.seq(), Some(i as u64));
        }
    }

    #[tokio::test]
    async fn test_capture_and_preview_flow() {
        let fx = fixture().await;

        let id = fx
            .service
            .handle_resource_change(change())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "0");

        let consumed = fx
            .service
            .handle_render_response(response(&fx.renderer.last_correlation()))
            .await
            .unwrap();
        assert!(consumed);

        let snapshots = fx.service.timeline_snapshot().await;
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].has_preview());
    }

    #[tokio::test]
    async fn test_change_without_client_is_dropped() {
        let renderer = Arc::new(RecordingRenderer::default());
        let service = RevisionService::new(
            Arc::new(MemoryStorage::new()),
            renderer,
            Arc::new(MemoryWriter::default()),
            CaptureConfig::default(),
        );
        service.set_model(Some(FakeModel::new("<uml/>"))).await;

        let result = service.handle_resource_change(change()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_change_without_model_is_dropped() {
        let fx = fixture().await;
        fx.service.set_model(None).await;

        let result = fx.service.handle_resource_change(change()).await.unwrap();
        assert!(result.is_none());
        assert!(fx.service.timeline_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_export_dispatch() {
        let fx = fixture().await;
        capture(&fx, 3).await;

        let update = fx
            .service
            .dispatch(Action::ExportTimeline {
                scope: ExportScope::Last { count: Some(2) },
            })
            .await
            .unwrap();

        let Update::ExportReady { file_name, data } = update else {
            panic!("expected ExportReady");
        };
        assert_eq!(file_name, "timeline-export.json");

        let exported: Vec<Snapshot> = serde_json::from_str(&data).unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].id.as_str(), "1");
        assert_eq!(exported[1].id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_import_round_trip() {
        let fx = fixture().await;
        capture(&fx, 2).await;
        let original = fx.service.timeline_snapshot().await;

        let Update::ExportReady { data, .. } = fx
            .service
            .request_export(&ExportScope::All)
            .await
            .unwrap()
        else {
            panic!("expected ExportReady");
        };

        let update = fx.service.request_import(&data).await.unwrap();
        let Update::TimelineChanged { snapshots } = update else {
            panic!("expected TimelineChanged");
        };
        assert_eq!(snapshots.len(), 2);
        assert_eq!(fx.service.timeline_snapshot().await, original);
    }

    #[tokio::test]
    async fn test_import_malformed_leaves_timeline_unchanged() {
        let fx = fixture().await;
        capture(&fx, 2).await;

        let err = fx.service.request_import("not json").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Timeline(TimelineError::Parse(_))
        ));
        assert_eq!(fx.service.timeline_snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_restore_dispatch() {
        let fx = fixture().await;
        capture(&fx, 4).await;

        let update = fx
            .service
            .dispatch(Action::RestoreSnapshot {
                request_id: "req_1".to_string(),
                snapshot_id: "1".to_string(),
            })
            .await
            .unwrap();

        let Update::RestoreCompleted { request_id, outcome } = update else {
            panic!("expected RestoreCompleted");
        };
        assert_eq!(request_id, "req_1");
        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                snapshot_id: "1".to_string()
            }
        );

        let snapshots = fx.service.timeline_snapshot().await;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            fx.writer
                .files
                .lock()
                .unwrap()
                .get("file:///work/diagram.uml")
                .map(String::as_str),
            Some("<uml v1/>")
        );

        // A later capture continues the sequence past the dropped ids
        fx.model.set_content("<uml v9/>");
        let id = fx
            .service
            .handle_resource_change(change())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id.as_str(), "4");
    }

    #[tokio::test]
    async fn test_restore_unknown_reports_not_found() {
        let fx = fixture().await;
        capture(&fx, 1).await;

        let outcome = fx
            .service
            .request_restore("req_9", &SnapshotId::from_seq(7))
            .await
            .unwrap();
        assert_eq!(outcome, RestoreOutcome::NotFound);
        assert_eq!(fx.service.timeline_snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rename_dispatch() {
        let fx = fixture().await;
        capture(&fx, 1).await;

        let update = fx
            .service
            .dispatch(Action::RenameSnapshot {
                snapshot_id: "0".to_string(),
                message: "Before refactor".to_string(),
            })
            .await
            .unwrap();

        let Update::TimelineChanged { snapshots } = update else {
            panic!("expected TimelineChanged");
        };
        assert_eq!(snapshots[0].message, "Before refactor");

        let err = fx
            .service
            .request_rename(&SnapshotId::from_seq(9), "nope")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Timeline(TimelineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_export_preview_dispatch() {
        let fx = fixture().await;

        // Snapshot without a preview first
        fx.service
            .handle_resource_change(change())
            .await
            .unwrap()
            .unwrap();
        let err = fx
            .service
            .export_preview(&SnapshotId::from_seq(0))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoPreview(_)));

        // Attach the preview, then the export succeeds
        fx.service
            .handle_render_response(response(&fx.renderer.last_correlation()))
            .await
            .unwrap();

        let update = fx
            .service
            .dispatch(Action::ExportPreview {
                snapshot_id: "0".to_string(),
            })
            .await
            .unwrap();
        let Update::PreviewReady { file_name, svg } = update else {
            panic!("expected PreviewReady");
        };
        assert_eq!(file_name, "0.svg");
        assert_eq!(svg, "<svg/>");
    }

    #[tokio::test]
    async fn test_commands_without_client_are_rejected() {
        let service = RevisionService::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingRenderer::default()),
            Arc::new(MemoryWriter::default()),
            CaptureConfig::default(),
        );

        let err = service.request_export(&ExportScope::All).await.unwrap_err();
        assert!(matches!(err, CoreError::NoActiveClient));
    }

    #[tokio::test]
    async fn test_session_swap_reloads_timeline() {
        let fx = fixture().await;
        capture(&fx, 2).await;

        fx.service
            .handle_connection(ConnectionEvent::ActiveClientChanged {
                document_id: "model-b".to_string(),
            })
            .await;
        assert!(fx.service.timeline_snapshot().await.is_empty());

        fx.service
            .handle_connection(ConnectionEvent::ActiveClientChanged {
                document_id: "model-a".to_string(),
            })
            .await;
        assert_eq!(fx.service.timeline_snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_export_render_pass_through() {
        let fx = fixture().await;
        let mut rx = fx.service.bus().subscribe::<crate::bus::PreviewExportReady>().await;

        let correlation = fx.service.request_export_render().await.unwrap();
        assert!(fx.service.timeline_snapshot().await.is_empty());

        fx.service
            .handle_render_response(response(&correlation))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.correlation_id, correlation);
        assert!(fx.service.timeline_snapshot().await.is_empty());
    }
}
