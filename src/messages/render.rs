//! Render state - data structure sent from App layer to UI for rendering

use crate::models::{Identity, RequestSpec, Response};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub identity: Identity,
    pub spec: RequestSpec,

    // Derived from the request on every change
    pub url: String,
    pub curl: String,

    pub is_loading: bool,
    pub response: Option<Response>,
    /// Transport or validation message, shown instead of a response
    pub error: Option<String>,
}
