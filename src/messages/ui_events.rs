//! UI events - messages from UI layer to App layer

use crate::models::{Field, HttpMethod};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone)]
pub enum UiEvent {
    // Request line
    SetMethod(HttpMethod),
    SetContentType(String),
    SetBody(String),

    // Headers
    AddHeader,
    RemoveHeader(usize),
    UpdateHeader { index: usize, field: Field, value: String },
    InsertHeader { key: String, value: String },

    // Query parameters
    AddParam,
    RemoveParam(usize),
    UpdateParam { index: usize, field: Field, value: String },
    InsertParam { key: String, value: String },

    // HTTP Request actions
    SendRequest,
    CancelRequest,

    // System
    Close,
}
