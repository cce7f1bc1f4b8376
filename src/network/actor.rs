//! Network actor - runs HTTP requests in the Tokio async runtime

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::ExecuteError;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{ReqwestTransport, Transport};
use crate::network::executor::RequestExecutor;

/// Network actor that processes HTTP request commands
pub struct NetworkActor<T: Transport + 'static = ReqwestTransport> {
    executor: Arc<RequestExecutor<T>>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, CancellationToken>,
}

impl NetworkActor<ReqwestTransport> {
    pub fn new(response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        Self::with_executor(RequestExecutor::default(), response_tx)
    }
}

impl<T: Transport + 'static> NetworkActor<T> {
    pub fn with_executor(
        executor: RequestExecutor<T>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            executor: Arc::new(executor),
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteRequest { id, request, timeout }) => {
                            let cancel = CancellationToken::new();
                            self.cancel_handles.insert(id, cancel.clone());

                            let executor = self.executor.clone();
                            let response_tx = self.response_tx.clone();

                            self.active_requests.spawn(async move {
                                let result = executor.execute_prepared(&request, timeout, &cancel).await;
                                let response = match result {
                                    Ok(response) => NetworkResponse::Completed { id, response },
                                    Err(ExecuteError::Transport(error)) => NetworkResponse::Failed { id, error },
                                    Err(ExecuteError::Cancelled) => NetworkResponse::Cancelled { id },
                                    Err(ExecuteError::Busy) => NetworkResponse::Rejected { id },
                                };
                                let _ = response_tx.send(response);
                                id
                            });
                        }

                        Some(NetworkCommand::CancelRequest(id)) => {
                            if let Some(cancel) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling request");
                                cancel.cancel();
                            }
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            for (_, cancel) in self.cancel_handles.drain() {
                                cancel.cancel();
                            }
                            break;
                        }
                    }
                }

                Some(joined) = self.active_requests.join_next() => {
                    if let Ok(id) = joined {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }

        // Let cancelled tasks report before the channel closes
        while self.active_requests.join_next().await.is_some() {}
    }
}
