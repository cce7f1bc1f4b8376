//! Harness state - the request being edited and the last outcome

use crate::config::HarnessConfig;
use crate::curl;
use crate::error::ValidationError;
use crate::messages::RenderState;
use crate::models::{Identity, PreparedRequest, RequestSpec, Response};
use crate::network::client::{prepare_request, validate_headers};
use crate::storage::RequestStore;
use crate::url::{build_url, validate_path};

/// One open test harness for a single endpoint
pub struct Harness {
    pub identity: Identity,
    /// Endpoint path below the project, defaults to the script name
    pub path: String,
    pub config: HarnessConfig,

    // Request being edited, mirrored to the store on every change
    pub spec: RequestSpec,
    pub(crate) store: RequestStore,

    // Outcome of the last send
    pub response: Option<Response>,
    pub error: Option<String>,
    pub is_loading: bool,
    pub(crate) next_request_id: u64,
    pub pending_request_id: Option<u64>,
}

impl Harness {
    /// Open the harness for `identity`, restoring its last snapshot
    pub fn open(
        identity: Identity,
        path: Option<String>,
        config: HarnessConfig,
        store: RequestStore,
    ) -> Self {
        let mut spec = store.load(&identity);
        spec.ensure_editable_rows();
        let path = path.unwrap_or_else(|| default_path(&identity.script).to_string());

        tracing::info!(%identity, path = %path, "Opened harness");

        Harness {
            identity,
            path,
            config,
            spec,
            store,
            response: None,
            error: None,
            is_loading: false,
            next_request_id: 1,
            pending_request_id: None,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn request_url(&self) -> String {
        build_url(
            &self.config.base_url,
            &self.identity.project,
            &self.path,
            &self.spec.query_params,
        )
    }

    pub fn prepared_request(&self) -> PreparedRequest {
        prepare_request(&self.spec, &self.request_url())
    }

    pub fn curl_command(&self) -> String {
        curl::to_curl(&self.prepared_request())
    }

    /// Checks that must pass before anything is sent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config.validate_path {
            validate_path(&self.path)?;
        }
        validate_headers(&self.prepared_request().headers)?;
        if self.config.validate_json_body && is_json(&self.spec.content_type) {
            if let Some(body) = self.spec.attached_body() {
                serde_json::from_str::<serde_json::Value>(body)
                    .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
            }
        }
        Ok(())
    }

    pub(crate) fn persist(&self) {
        self.store.save(&self.identity, &self.spec);
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            identity: self.identity.clone(),
            spec: self.spec.clone(),
            url: self.request_url(),
            curl: self.curl_command(),
            is_loading: self.is_loading,
            response: self.response.clone(),
            error: self.error.clone(),
        }
    }
}

/// Scripts are served under their name without the `.lua` extension
fn default_path(script: &str) -> &str {
    script.strip_suffix(".lua").unwrap_or(script)
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
