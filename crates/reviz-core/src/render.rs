//! Render service interface.
//!
//! Rendering is asynchronous and decoupled: the engine issues a request
//! carrying a correlation id and, at some later point, the host feeds the
//! matching [`RenderResponse`] back through
//! [`RevisionService::handle_render_response`](crate::service::RevisionService::handle_render_response).
//! There is no cancellation; a request whose response never arrives simply
//! leaves its snapshot without a preview.

use crate::error::CoreResult;
use async_trait::async_trait;
use reviz_protocol::RenderRequest;

/// Outbound channel to the external diagram renderer.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Issue a render request. The response arrives on a separate channel.
    async fn request_render(&self, request: RenderRequest) -> CoreResult<()>;
}
