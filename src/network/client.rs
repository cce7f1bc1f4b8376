//! HTTP client wrapper - assembles requests and performs the round trip

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::error::{TransportError, ValidationError};
use crate::models::{HttpMethod, PreparedRequest, RequestSpec};

/// A complete HTTP reply, before timing is attached
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Performs one HTTP round trip, including reading the whole body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpReply, TransportError>;
}

/// Resolve headers and body for `spec` against an already built URL.
///
/// Non-blank headers keep their order and duplicates. `Content-Type` and
/// `Accept` are appended from the content type unless the user supplied them.
pub fn prepare_request(spec: &RequestSpec, url: &str) -> PreparedRequest {
    let mut headers: Vec<(String, String)> = spec
        .active_headers()
        .map(|h| (h.key.clone(), h.value.clone()))
        .collect();

    if !spec.content_type.is_empty() {
        let has = |name: &str| headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name));
        let add_content_type = !has("content-type");
        let add_accept = !has("accept");
        if add_content_type {
            headers.push(("Content-Type".to_string(), spec.content_type.clone()));
        }
        if add_accept {
            headers.push(("Accept".to_string(), spec.content_type.clone()));
        }
    }

    PreparedRequest {
        method: spec.method,
        url: url.to_string(),
        headers,
        body: spec.attached_body().map(str::to_string),
    }
}

/// Reject header lines HTTP cannot carry.
///
/// Keys may hold no control characters at all; values may hold tabs.
pub fn validate_headers(headers: &[(String, String)]) -> Result<(), ValidationError> {
    for (key, value) in headers {
        let bad_key = key.chars().any(|c| c.is_control());
        let bad_value = value.chars().any(|c| c.is_control() && c != '\t');
        if bad_key || bad_value {
            return Err(ValidationError::HeaderControlCharacters(key.clone()));
        }
    }
    Ok(())
}

/// Production transport backed by reqwest
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(create_client())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpReply, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.url, e)))?;

        let mut req_builder = match request.method {
            HttpMethod::GET => self.client.get(url),
            HttpMethod::POST => self.client.post(url),
            HttpMethod::PUT => self.client.put(url),
            HttpMethod::PATCH => self.client.patch(url),
            HttpMethod::DELETE => self.client.delete(url),
        };

        // `header` appends, so repeated keys go out as repeated lines
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let resp = req_builder.send().await.map_err(classify)?;

        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();

        let mut stream = resp.bytes_stream();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| TransportError::Body(e.to_string()))?;
            body.extend_from_slice(&bytes);
        }

        Ok(HttpReply {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// Create an HTTP client that reports redirects instead of following them.
///
/// Timeouts are applied per call by the executor.
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, KeyValue};

    const URL: &str = "http://localhost:3000/demo/hello.lua";

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_headers_added() {
        let prepared = prepare_request(&RequestSpec::default(), URL);
        assert_eq!(prepared.method, HttpMethod::POST);
        assert_eq!(prepared.url, URL);
        assert_eq!(
            prepared.headers,
            pairs(&[
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
            ])
        );
        assert_eq!(prepared.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_explicit_headers_win_case_insensitively() {
        let mut spec = RequestSpec::default();
        spec.insert_header("content-TYPE", "text/csv");
        spec.insert_header("ACCEPT", "*/*");
        let prepared = prepare_request(&spec, URL);
        assert_eq!(
            prepared.headers,
            pairs(&[("content-TYPE", "text/csv"), ("ACCEPT", "*/*")])
        );
    }

    #[test]
    fn test_only_missing_default_is_added() {
        let mut spec = RequestSpec::default();
        spec.set_content_type("text/plain");
        spec.insert_header("Accept", "application/xml");
        let prepared = prepare_request(&spec, URL);
        assert_eq!(
            prepared.headers,
            pairs(&[("Accept", "application/xml"), ("Content-Type", "text/plain")])
        );
    }

    #[test]
    fn test_blank_rows_dropped_and_duplicates_kept() {
        let mut spec = RequestSpec::default();
        spec.headers = vec![
            KeyValue::new("X-Dup", "1"),
            KeyValue::new("X-Blank", ""),
            KeyValue::new("", "orphan"),
            KeyValue::new("X-Dup", "2"),
        ];
        spec.set_content_type("");
        let prepared = prepare_request(&spec, URL);
        assert_eq!(prepared.headers, pairs(&[("X-Dup", "1"), ("X-Dup", "2")]));
    }

    #[test]
    fn test_get_drops_body() {
        let mut spec = RequestSpec::default();
        spec.set_method(HttpMethod::GET);
        spec.set_body("{\"ignored\":true}");
        spec.update_header(0, Field::Key, "X-Test");
        spec.update_header(0, Field::Value, "1");
        let prepared = prepare_request(&spec, URL);
        assert_eq!(prepared.body, None);
        assert_eq!(prepared.headers[0], ("X-Test".to_string(), "1".to_string()));
    }

    #[test]
    fn test_validate_headers() {
        assert!(validate_headers(&pairs(&[("X-Tab", "a\tb"), ("Accept", "*/*")])).is_ok());
        assert_eq!(
            validate_headers(&pairs(&[("X-A", "line1\nline2")])),
            Err(ValidationError::HeaderControlCharacters("X-A".to_string()))
        );
        assert!(validate_headers(&pairs(&[("X-\rB", "v")])).is_err());
        assert!(validate_headers(&pairs(&[("X\tC", "v")])).is_err());
    }
}
