//! # scriptprobe
//!
//! An ad-hoc HTTP request harness for remotely executed scripts.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE
//! - Ordered headers and query parameters (duplicates preserved)
//! - One persisted request per (project, script)
//! - Raw responses with timing; error statuses are responses, not failures
//! - curl reproduction of exactly what was sent
//! - Timeout and cancellation
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer - the CLI, or any other front end
//! - App Layer (harness state)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod curl;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod url;
pub mod viewer;

// Re-export commonly used types
pub use app::{Harness, HarnessActor};
pub use config::HarnessConfig;
pub use curl::{generate, parse_curl, to_curl};
pub use error::{ExecuteError, TransportError, ValidationError};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{Field, HttpMethod, Identity, KeyValue, PreparedRequest, RequestSpec, Response, StatusClass};
pub use network::{prepare_request, NetworkActor, RequestExecutor, ReqwestTransport, Transport};
pub use storage::{FileStore, KeyValueStore, MemoryStore, RequestStore};
pub use url::build_url;
