//! Network layer - HTTP request execution
//!
//! The Network actor receives request commands and sends back outcomes.

pub mod actor;
pub mod client;
pub mod executor;

pub use actor::NetworkActor;
pub use client::{prepare_request, validate_headers, HttpReply, ReqwestTransport, Transport};
pub use executor::RequestExecutor;
