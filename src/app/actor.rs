//! Harness actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::Harness;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// Actor that owns one harness and keeps the UI responsive while requests run
pub struct HarnessActor {
    harness: Harness,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl HarnessActor {
    pub fn new(
        harness: Harness,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        HarnessActor {
            harness,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.harness.to_render_state());

        loop {
            tokio::select! {
                event = ui_rx.recv() => {
                    // A dropped UI closes the harness like an explicit Close
                    let closed = match event {
                        Some(event) => self.handle_ui_event(event),
                        None => true,
                    };
                    if closed {
                        self.harness.close();
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.harness.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.harness.handle_response(response);
                    let _ = self.render_tx.send(self.harness.to_render_state());
                }
            }
        }
    }

    /// Handle a UI event, returns true if the harness was closed
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::SetMethod(method) => self.harness.set_method(method),
            UiEvent::SetContentType(content_type) => self.harness.set_content_type(content_type),
            UiEvent::SetBody(body) => self.harness.set_body(body),

            UiEvent::AddHeader => self.harness.add_header(),
            UiEvent::RemoveHeader(index) => self.harness.remove_header(index),
            UiEvent::UpdateHeader { index, field, value } => {
                self.harness.update_header(index, field, value)
            }
            UiEvent::InsertHeader { key, value } => self.harness.insert_header(key, value),

            UiEvent::AddParam => self.harness.add_param(),
            UiEvent::RemoveParam(index) => self.harness.remove_param(index),
            UiEvent::UpdateParam { index, field, value } => {
                self.harness.update_param(index, field, value)
            }
            UiEvent::InsertParam { key, value } => self.harness.insert_param(key, value),

            UiEvent::SendRequest => {
                if let Some(cmd) = self.harness.prepare_request() {
                    let _ = self.network_tx.send(cmd);
                }
            }
            UiEvent::CancelRequest => {
                if let Some(cmd) = self.harness.cancel_request() {
                    let _ = self.network_tx.send(cmd);
                }
            }

            UiEvent::Close => return true,
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::error::TransportError;
    use crate::models::{HttpMethod, Identity, PreparedRequest};
    use crate::network::client::{HttpReply, Transport};
    use crate::network::{NetworkActor, RequestExecutor};
    use crate::storage::{MemoryStore, RequestStore};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Echoes the request body back with a 201
    struct EchoTransport {
        seen: Arc<Mutex<Vec<PreparedRequest>>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: &PreparedRequest) -> Result<HttpReply, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(HttpReply {
                status: 201,
                status_text: "Created".to_string(),
                headers: Vec::new(),
                body: request.body.clone().unwrap_or_default(),
            })
        }
    }

    #[tokio::test]
    async fn test_actor_round_trip() {
        let backend = MemoryStore::new();
        let identity = Identity::new("demo", "hello.lua");
        let harness = Harness::open(
            identity.clone(),
            None,
            HarnessConfig::default(),
            RequestStore::new(backend.clone()),
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel();
        let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel();
        let (render_tx, mut render_rx) = mpsc::unbounded_channel();

        let network = NetworkActor::with_executor(
            RequestExecutor::new(EchoTransport { seen: seen.clone() }),
            net_resp_tx,
        );
        tokio::spawn(network.run(net_cmd_rx));
        let app = tokio::spawn(HarnessActor::new(harness, net_cmd_tx, render_tx).run(ui_rx, net_resp_rx));

        let initial = render_rx.recv().await.unwrap();
        assert_eq!(initial.url, "http://localhost:3000/demo/hello");
        assert!(initial.curl.starts_with("curl -X POST"));

        ui_tx.send(UiEvent::SetMethod(HttpMethod::PUT)).unwrap();
        ui_tx.send(UiEvent::SetBody("{\"x\":1}".to_string())).unwrap();
        ui_tx.send(UiEvent::SendRequest).unwrap();

        let done = loop {
            let state = render_rx.recv().await.unwrap();
            if state.response.is_some() {
                break state;
            }
        };
        let response = done.response.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "{\"x\":1}");
        assert!(!done.is_loading);
        assert_eq!(seen.lock().unwrap()[0].method, HttpMethod::PUT);

        ui_tx.send(UiEvent::Close).unwrap();
        app.await.unwrap();

        let reloaded = RequestStore::new(backend).load(&identity);
        assert_eq!(reloaded.method, HttpMethod::PUT);
        assert_eq!(reloaded.body, "{\"x\":1}");
    }

    #[tokio::test]
    async fn test_dropped_ui_closes_harness() {
        let backend = MemoryStore::new();
        let identity = Identity::new("demo", "hello.lua");
        let harness = Harness::open(
            identity.clone(),
            None,
            HarnessConfig::default(),
            RequestStore::new(backend.clone()),
        );

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel();
        let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel();
        let (render_tx, mut render_rx) = mpsc::unbounded_channel();

        let network = NetworkActor::with_executor(
            RequestExecutor::new(EchoTransport {
                seen: Arc::new(Mutex::new(Vec::new())),
            }),
            net_resp_tx,
        );
        let net = tokio::spawn(network.run(net_cmd_rx));
        let app = tokio::spawn(HarnessActor::new(harness, net_cmd_tx, render_tx).run(ui_rx, net_resp_rx));

        render_rx.recv().await.unwrap();
        ui_tx.send(UiEvent::SetMethod(HttpMethod::DELETE)).unwrap();
        render_rx.recv().await.unwrap();
        drop(ui_tx);

        let limit = std::time::Duration::from_secs(2);
        tokio::time::timeout(limit, app).await.unwrap().unwrap();
        tokio::time::timeout(limit, net).await.unwrap().unwrap();

        let reloaded = RequestStore::new(backend).load(&identity);
        assert_eq!(reloaded.method, HttpMethod::DELETE);
    }
}
