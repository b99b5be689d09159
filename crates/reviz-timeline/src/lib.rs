//! Snapshot timeline model for reviz.
//!
//! A timeline is the ordered, per-document sequence of snapshots a user can
//! browse and restore. This crate provides:
//! - the [`Snapshot`]/[`Timeline`] data model,
//! - [`TimelineStore`], which keeps the active timeline in memory and
//!   persists it through an injected [`TimelineRepository`],
//! - the import/export [`codec`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reviz_storage::MemoryStorage;
//! use reviz_timeline::{DocumentKey, Snapshot, TimelineStore};
//!
//! # async fn example() {
//! let repository = Arc::new(MemoryStorage::new());
//! let key = DocumentKey::new("model-a");
//! let mut store = TimelineStore::load(repository, key).await;
//!
//! let snapshot = Snapshot::new(store.next_id(), "File saved", vec![]);
//! store.append(snapshot).await;
//! # }
//! ```

pub mod codec;
mod error;
mod snapshot;
mod store;
mod timeline;

pub use error::{TimelineError, TimelineResult};
pub use snapshot::{Preview, ResourceSnapshot, Snapshot, SnapshotId};
pub use store::{TimelineRepository, TimelineStore, TIMELINE_NAMESPACE};
pub use timeline::{DocumentKey, Timeline};
