//! Wire types for communication between reviz and its host editor.
//!
//! The engine talks to three collaborators, all through serde types defined
//! here:
//! - the host UI, which sends command-style [`Action`]s and receives push
//!   [`Update`]s,
//! - the diagram renderer, which answers [`RenderRequest`]s asynchronously
//!   with [`RenderResponse`]s matched by correlation id,
//! - the host workspace, which delivers [`ResourceChange`] notifications and
//!   [`ConnectionEvent`] lifecycle signals.

mod action;
mod render;
mod state;
mod update;

pub use action::{Action, ExportScope};
pub use render::{Bounds, RenderRequest, RenderResponse};
pub use state::{ChangeKind, ConnectionEvent, ResourceChange};
pub use update::{RestoreOutcome, SnapshotInfo, Update};
