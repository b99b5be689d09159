//! Core coordination for reviz.
//!
//! This crate provides the snapshot capture-and-restore engine:
//! - Event bus pushing timeline updates to the host UI
//! - Document session lifecycle (one active timeline at a time)
//! - Capture coordination: debounce/dedup policy and render-response
//!   correlation
//! - Restore execution: truncate-and-write-back with explicit outcomes
//! - A filesystem change source scoped to the model resource extension
//!
//! Everything host-specific (rendering, live buffers, durable storage) sits
//! behind the traits in [`document`], [`render`] and
//! [`reviz_timeline::TimelineRepository`].

pub mod bus;
pub mod capture;
pub mod config;
pub mod document;
pub mod error;
pub mod render;
pub mod restore;
pub mod service;
pub mod session;
pub mod watch;

pub use bus::{
    Bus, BusEvent, Event, PreviewAttached, PreviewExportReady, RestoreCompleted, SessionActivated,
    SessionClosed, SnapshotCaptured, TimelineChanged,
};
pub use capture::CaptureCoordinator;
pub use config::CaptureConfig;
pub use document::{DocumentModel, ModelResource, ResourceWriter};
pub use error::{CoreError, CoreResult};
pub use render::RenderService;
pub use restore::RestoreExecutor;
pub use service::RevisionService;
pub use session::{CaptureState, DocumentSession, SessionManager};
pub use watch::{ChangeSource, FsChangeSource};
