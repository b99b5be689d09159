//! Render request/response types.
//!
//! The engine never renders anything itself. It asks the external renderer
//! for an SVG of the current diagram and receives the answer asynchronously
//! on a separate channel; the two are matched by correlation id equality
//! only.

use serde::{Deserialize, Serialize};

/// Bounding box of a rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Request for a rendered preview of the current diagram state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Token echoed back in the matching [`RenderResponse`].
    pub correlation_id: String,
}

/// Asynchronous answer to a [`RenderRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    /// The correlation id of the request this answers.
    pub correlation_id: String,
    /// Rendered SVG markup.
    pub svg: String,
    /// Bounding box of the rendered content.
    pub bounds: Bounds,
}
