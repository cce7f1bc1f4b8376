//! Single-flight request execution with timing, timeout and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{ExecuteError, TransportError};
use crate::models::{PreparedRequest, RequestSpec, Response};
use crate::network::client::{prepare_request, ReqwestTransport, Transport};

/// Executes at most one request at a time over an injected transport.
///
/// A call made while another is in flight is rejected with
/// `ExecuteError::Busy`; nothing is queued.
pub struct RequestExecutor<T: Transport = ReqwestTransport> {
    transport: T,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the call ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T) -> Self {
        RequestExecutor {
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Prepare `spec` against `url` and execute it
    pub async fn execute(
        &self,
        spec: &RequestSpec,
        url: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Response, ExecuteError> {
        let request = prepare_request(spec, url);
        self.execute_prepared(&request, timeout, cancel).await
    }

    /// Execute an already prepared request.
    ///
    /// Any status code the server answers with is a `Response`. Duration
    /// covers sending through reading the last body byte.
    pub async fn execute_prepared(
        &self,
        request: &PreparedRequest,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Response, ExecuteError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(url = %request.url, "Rejected request while another is in flight");
            return Err(ExecuteError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        tracing::info!(method = %request.method, url = %request.url, "Executing request");
        let start = Instant::now();

        let round_trip = async {
            let send = self.transport.send(request);
            match timeout {
                Some(limit) => tokio::time::timeout(limit, send)
                    .await
                    .unwrap_or(Err(TransportError::Timeout(limit))),
                None => send.await,
            }
        };

        let result = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::info!(url = %request.url, "Request cancelled");
                return Err(ExecuteError::Cancelled);
            }
            result = round_trip => result,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(reply) => {
                tracing::info!(status = reply.status, duration_ms, "Request completed");
                Ok(Response {
                    status: reply.status,
                    status_text: reply.status_text,
                    headers: reply.headers,
                    body: reply.body,
                    duration_ms,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, duration_ms, "Request failed");
                Err(ExecuteError::Transport(e))
            }
        }
    }
}

impl Default for RequestExecutor<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ReqwestTransport::default())
    }
}
