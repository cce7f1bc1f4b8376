//! Error types for request execution.
//!
//! A received 4xx/5xx is a `Response`, never one of these. `TransportError`
//! covers only the cases where no HTTP response was obtained at all.

use std::time::Duration;

use thiserror::Error;

/// No HTTP response could be obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out ({}ms)", .0.as_millis())]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Error reading body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Other(String),
}

/// Request rejected locally before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid path: cannot use parent directory references")]
    ParentReference,

    #[error("Invalid path: {0:?} contains characters outside [A-Za-z0-9._~/-]")]
    DisallowedCharacters(String),

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("Invalid header {0:?}: control characters are not allowed")]
    HeaderControlCharacters(String),
}

/// Everything `RequestExecutor::execute` can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("A request is already in flight")]
    Busy,

    #[error("Request cancelled")]
    Cancelled,

    #[error(transparent)]
    Transport(#[from] TransportError),
}
