//! Host-side document interfaces.
//!
//! The engine reads the live document and writes it back only through the
//! traits defined here; concrete bindings (GLSP model state, text buffers,
//! plain files) live in the host.

use crate::error::CoreResult;
use async_trait::async_trait;

/// One resource of the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResource {
    /// URI of the resource.
    pub uri: String,
    /// Current serialized content.
    pub content: String,
    /// Serialization format (e.g. "xml", "json").
    pub format: String,
}

/// Read access to the live document model.
#[async_trait]
pub trait DocumentModel: Send + Sync {
    /// Stable identifier of the source model backing the editor.
    fn source_model_id(&self) -> String;

    /// Current contents of every resource belonging to the document.
    async fn resources(&self) -> CoreResult<Vec<ModelResource>>;
}

/// Write access to the live document.
#[async_trait]
pub trait ResourceWriter: Send + Sync {
    /// Overwrite the live resource at `uri` with `content`.
    ///
    /// If the resource is open in an editor view, the editable buffer is
    /// replaced in full (not diff-patched), discarding unsaved edits.
    async fn write_resource(&self, uri: &str, content: &str) -> CoreResult<()>;
}
