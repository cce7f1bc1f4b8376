//! Network messages - communication between App and Network layers

use std::time::Duration;

use crate::error::TransportError;
use crate::models::{PreparedRequest, Response};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute a prepared HTTP request
    ExecuteRequest {
        id: u64,
        request: PreparedRequest,
        timeout: Option<Duration>,
    },
    /// Cancel a pending request
    CancelRequest(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The server answered, whatever the status
    Completed { id: u64, response: Response },
    /// No HTTP response could be obtained
    Failed { id: u64, error: TransportError },
    /// Request was cancelled
    Cancelled { id: u64 },
    /// Another request was still in flight
    Rejected { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Failed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
            NetworkResponse::Rejected { id } => *id,
        }
    }
}
