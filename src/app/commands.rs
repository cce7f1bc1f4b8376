//! Command handlers - business logic for processing UI events

use crate::app::Harness;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{Field, HttpMethod};

impl Harness {
    // ========================
    // Request line
    // ========================

    pub fn set_method(&mut self, method: HttpMethod) {
        self.spec.set_method(method);
        self.persist();
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.spec.set_content_type(content_type);
        self.persist();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.spec.set_body(body);
        self.persist();
    }

    // ========================
    // Headers
    // ========================

    pub fn add_header(&mut self) {
        self.spec.add_header();
        self.persist();
    }

    pub fn remove_header(&mut self, index: usize) {
        self.spec.remove_header(index);
        self.persist();
    }

    pub fn update_header(&mut self, index: usize, field: Field, value: impl Into<String>) {
        self.spec.update_header(index, field, value);
        self.persist();
    }

    pub fn insert_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.spec.insert_header(key, value);
        self.persist();
    }

    // ========================
    // Query parameters
    // ========================

    pub fn add_param(&mut self) {
        self.spec.add_param();
        self.persist();
    }

    pub fn remove_param(&mut self, index: usize) {
        self.spec.remove_param(index);
        self.persist();
    }

    pub fn update_param(&mut self, index: usize, field: Field, value: impl Into<String>) {
        self.spec.update_param(index, field, value);
        self.persist();
    }

    pub fn insert_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.spec.insert_param(key, value);
        self.persist();
    }

    // ========================
    // Sending
    // ========================

    /// Build the command for the network layer.
    ///
    /// Returns `None` while another request is pending, or when validation
    /// fails (the message lands in `error`).
    pub fn prepare_request(&mut self) -> Option<NetworkCommand> {
        if self.is_loading {
            tracing::warn!(identity = %self.identity, "Send ignored, request already in flight");
            return None;
        }

        if let Err(e) = self.validate() {
            self.response = None;
            self.error = Some(e.to_string());
            return None;
        }

        self.is_loading = true;
        self.response = None;
        self.error = None;

        let id = self.next_id();
        self.pending_request_id = Some(id);

        Some(NetworkCommand::ExecuteRequest {
            id,
            request: self.prepared_request(),
            timeout: self.config.timeout,
        })
    }

    /// Cancel the current pending request
    pub fn cancel_request(&mut self) -> Option<NetworkCommand> {
        self.pending_request_id.map(NetworkCommand::CancelRequest)
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        // Outcomes of superseded requests are dropped
        if self.pending_request_id != Some(response.id()) {
            return;
        }

        match response {
            NetworkResponse::Completed { response, .. } => {
                self.response = Some(response);
                self.error = None;
            }
            NetworkResponse::Failed { error, .. } => {
                self.response = None;
                self.error = Some(error.to_string());
            }
            NetworkResponse::Cancelled { .. } => {
                self.response = None;
                self.error = Some(String::from("Request cancelled"));
            }
            NetworkResponse::Rejected { .. } => {
                self.error = Some(String::from("A request is already in flight"));
            }
        }

        self.is_loading = false;
        self.pending_request_id = None;
    }

    /// Final save when the harness is dismissed
    pub fn close(&mut self) {
        self.persist();
        tracing::info!(identity = %self.identity, "Closed harness");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::error::TransportError;
    use crate::models::{Identity, KeyValue, RequestSpec, Response};
    use crate::storage::{KeyValueStore, MemoryStore, RequestStore};

    fn open(backend: &MemoryStore, config: HarnessConfig) -> Harness {
        Harness::open(
            Identity::new("demo", "hello.lua"),
            None,
            config,
            RequestStore::new(backend.clone()),
        )
    }

    fn response(status: u16) -> Response {
        Response {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: String::from("{}"),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_end_to_end_edit_save_reload() {
        let backend = MemoryStore::new();

        let mut harness = open(&backend, HarnessConfig::default());
        assert_eq!(harness.spec, RequestSpec::default());

        harness.set_method(HttpMethod::GET);
        harness.update_header(0, Field::Key, "X-Test");
        harness.update_header(0, Field::Value, "1");
        harness.add_header();
        harness.close();

        let reopened = open(&backend, HarnessConfig::default());
        assert_eq!(reopened.spec.method, HttpMethod::GET);
        let active: Vec<_> = reopened.spec.active_headers().collect();
        assert_eq!(active, vec![&KeyValue::new("X-Test", "1")]);
        assert_eq!(reopened.spec, harness.spec);
    }

    #[test]
    fn test_every_edit_is_persisted() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        let key = harness.identity.storage_key();

        assert_eq!(backend.get(&key).unwrap(), None);
        harness.set_body("{\"n\":1}");
        assert!(backend.get(&key).unwrap().unwrap().contains("{\\\"n\\\":1}"));

        harness.insert_param("page", "2");
        let reloaded = RequestStore::new(backend.clone()).load(&harness.identity);
        assert_eq!(reloaded, harness.spec);
    }

    #[test]
    fn test_url_and_curl_follow_spec() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        harness.insert_param("q", "a b");

        assert_eq!(
            harness.request_url(),
            "http://localhost:3000/demo/hello?q=a%20b"
        );
        let parsed = crate::curl::parse_curl(&harness.curl_command()).unwrap();
        assert_eq!(parsed, harness.prepared_request());
    }

    #[test]
    fn test_second_send_rejected_while_loading() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());

        let first = harness.prepare_request();
        assert!(matches!(first, Some(NetworkCommand::ExecuteRequest { id: 1, .. })));
        assert!(harness.is_loading);
        assert!(harness.prepare_request().is_none());

        harness.handle_response(NetworkResponse::Completed { id: 1, response: response(404) });
        assert!(!harness.is_loading);
        assert_eq!(harness.response.as_ref().map(|r| r.status), Some(404));
        assert_eq!(harness.error, None);
        assert!(harness.prepare_request().is_some());
    }

    #[test]
    fn test_transport_error_surfaces_and_is_not_persisted() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = harness.prepare_request() else {
            panic!("expected a request");
        };

        harness.handle_response(NetworkResponse::Failed {
            id,
            error: TransportError::Connect("refused".to_string()),
        });
        assert_eq!(harness.error.as_deref(), Some("Connection failed: refused"));
        assert!(harness.response.is_none());
        assert_eq!(backend.get(&harness.identity.storage_key()).unwrap(), None);
    }

    #[test]
    fn test_stale_outcome_ignored() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        harness.prepare_request();

        harness.handle_response(NetworkResponse::Completed { id: 99, response: response(200) });
        assert!(harness.is_loading);
        assert!(harness.response.is_none());
    }

    #[test]
    fn test_cancel() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        assert!(harness.cancel_request().is_none());

        harness.prepare_request();
        assert!(matches!(harness.cancel_request(), Some(NetworkCommand::CancelRequest(1))));
        harness.handle_response(NetworkResponse::Cancelled { id: 1 });
        assert_eq!(harness.error.as_deref(), Some("Request cancelled"));
        assert!(!harness.is_loading);
    }

    #[test]
    fn test_invalid_path_blocks_send_without_saving() {
        let backend = MemoryStore::new();
        let mut harness = Harness::open(
            Identity::new("demo", "hello.lua"),
            Some(String::from("../admin")),
            HarnessConfig::default(),
            RequestStore::new(backend.clone()),
        );

        assert!(harness.prepare_request().is_none());
        assert!(!harness.is_loading);
        assert!(harness.error.as_deref().unwrap().contains("parent directory"));
        assert_eq!(backend.get(&harness.identity.storage_key()).unwrap(), None);

        harness.config.validate_path = false;
        assert!(harness.prepare_request().is_some());
    }

    #[test]
    fn test_json_validation_is_optional() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        harness.set_body("{broken");
        assert!(harness.prepare_request().is_some());

        let mut strict = open(
            &backend,
            HarnessConfig {
                validate_json_body: true,
                ..HarnessConfig::default()
            },
        );
        assert!(strict.prepare_request().is_none());
        assert!(strict.error.as_deref().unwrap().starts_with("Invalid JSON format"));

        // Not sent, so not checked
        strict.set_method(HttpMethod::GET);
        assert!(strict.prepare_request().is_some());
    }

    #[test]
    fn test_default_path_drops_lua_extension() {
        let backend = MemoryStore::new();
        let harness = open(&backend, HarnessConfig::default());
        assert_eq!(harness.path, "hello");
        assert_eq!(harness.request_url(), "http://localhost:3000/demo/hello");
        assert_eq!(harness.identity.storage_key(), "test-request-demo-hello.lua");

        let plain = Harness::open(
            Identity::new("demo", "report"),
            None,
            HarnessConfig::default(),
            RequestStore::new(backend.clone()),
        );
        assert_eq!(plain.path, "report");

        let explicit = Harness::open(
            Identity::new("demo", "hello.lua"),
            Some(String::from("v1/hello.lua")),
            HarnessConfig::default(),
            RequestStore::new(backend),
        );
        assert_eq!(explicit.request_url(), "http://localhost:3000/demo/v1/hello.lua");
    }

    #[test]
    fn test_header_with_newline_blocks_send() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        harness.insert_header("X-A", "line1\nline2");

        assert!(harness.prepare_request().is_none());
        assert!(!harness.is_loading);
        assert_eq!(
            harness.error.as_deref(),
            Some("Invalid header \"X-A\": control characters are not allowed")
        );
    }

    #[test]
    fn test_rejected_outcome_clears_loading() {
        let backend = MemoryStore::new();
        let mut harness = open(&backend, HarnessConfig::default());
        let Some(NetworkCommand::ExecuteRequest { id, .. }) = harness.prepare_request() else {
            panic!("expected a request");
        };

        harness.handle_response(NetworkResponse::Rejected { id });
        assert!(!harness.is_loading);
        assert_eq!(harness.pending_request_id, None);
        assert_eq!(harness.error.as_deref(), Some("A request is already in flight"));
        assert!(harness.prepare_request().is_some());
    }

    #[test]
    fn test_snapshot_with_empty_lists_gets_editable_rows() {
        let backend = MemoryStore::new();
        backend
            .set(
                "test-request-demo-hello.lua",
                r#"{"requestMethod":"GET","headers":[],"queryParams":[]}"#,
            )
            .unwrap();

        let harness = open(&backend, HarnessConfig::default());
        assert_eq!(harness.spec.method, HttpMethod::GET);
        assert_eq!(harness.spec.headers, vec![KeyValue::default()]);
        assert_eq!(harness.spec.query_params, vec![KeyValue::default()]);
    }
}
