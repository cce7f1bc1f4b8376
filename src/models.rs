use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BODY, DEFAULT_CONTENT_TYPE, STORAGE_KEY_PREFIX};

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Every method except GET may carry a body
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("Unknown HTTP method: {}", s))
    }
}

/// One editable header or query parameter row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A row missing either half never reaches the wire
    pub fn is_blank(&self) -> bool {
        self.key.is_empty() || self.value.is_empty()
    }

    fn is_empty_row(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// Which half of a row an edit targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Key,
    Value,
}

/// Editable description of a single request.
///
/// Serialized field names are the persisted snapshot schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSpec {
    #[serde(rename = "requestMethod")]
    pub method: HttpMethod,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "requestBody")]
    pub body: String,
    pub headers: Vec<KeyValue>,
    #[serde(rename = "queryParams")]
    pub query_params: Vec<KeyValue>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        RequestSpec {
            method: HttpMethod::POST,
            content_type: String::from(DEFAULT_CONTENT_TYPE),
            body: String::from(DEFAULT_BODY),
            headers: vec![KeyValue::default()],
            query_params: vec![KeyValue::default()],
        }
    }
}

impl RequestSpec {
    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn add_header(&mut self) {
        self.headers.push(KeyValue::default());
    }

    pub fn remove_header(&mut self, index: usize) {
        remove_row(&mut self.headers, index);
    }

    pub fn update_header(&mut self, index: usize, field: Field, value: impl Into<String>) {
        update_row(&mut self.headers, index, field, value.into());
    }

    /// Fills the trailing empty row, or appends a new one
    pub fn insert_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        insert_row(&mut self.headers, KeyValue::new(key, value));
    }

    pub fn add_param(&mut self) {
        self.query_params.push(KeyValue::default());
    }

    pub fn remove_param(&mut self, index: usize) {
        remove_row(&mut self.query_params, index);
    }

    pub fn update_param(&mut self, index: usize, field: Field, value: impl Into<String>) {
        update_row(&mut self.query_params, index, field, value.into());
    }

    pub fn insert_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        insert_row(&mut self.query_params, KeyValue::new(key, value));
    }

    /// Headers that will actually be sent, in order
    pub fn active_headers(&self) -> impl Iterator<Item = &KeyValue> {
        self.headers.iter().filter(|h| !h.is_blank())
    }

    /// Query parameters that will actually be sent, in order
    pub fn active_params(&self) -> impl Iterator<Item = &KeyValue> {
        self.query_params.iter().filter(|p| !p.is_blank())
    }

    /// The body to attach, if any. GET never carries one.
    pub fn attached_body(&self) -> Option<&str> {
        if self.method.carries_body() && !self.body.trim().is_empty() {
            Some(&self.body)
        } else {
            None
        }
    }

    /// Restores the single blank row the editor needs in an emptied list
    pub fn ensure_editable_rows(&mut self) {
        if self.headers.is_empty() {
            self.headers.push(KeyValue::default());
        }
        if self.query_params.is_empty() {
            self.query_params.push(KeyValue::default());
        }
    }
}

fn remove_row(rows: &mut Vec<KeyValue>, index: usize) {
    if index < rows.len() {
        rows.remove(index);
    }
    if rows.is_empty() {
        rows.push(KeyValue::default());
    }
}

fn update_row(rows: &mut [KeyValue], index: usize, field: Field, value: String) {
    if let Some(row) = rows.get_mut(index) {
        match field {
            Field::Key => row.key = value,
            Field::Value => row.value = value,
        }
    }
}

fn insert_row(rows: &mut Vec<KeyValue>, row: KeyValue) {
    match rows.last_mut() {
        Some(last) if last.is_empty_row() => *last = row,
        _ => rows.push(row),
    }
}

/// The (project, script) pair a persisted request belongs to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    pub project: String,
    pub script: String,
}

impl Identity {
    pub fn new(project: impl Into<String>, script: impl Into<String>) -> Self {
        Identity {
            project: project.into(),
            script: script.into(),
        }
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}-{}", STORAGE_KEY_PREFIX, self.project, self.script)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.script)
    }
}

/// A request with headers assembled and the body resolved.
///
/// Both the executor and the curl generator consume this, so what is sent
/// and what is reproduced cannot drift apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Visual bucket for a received status code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Neutral,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Neutral,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusClass::ClientError | StatusClass::ServerError)
    }
}

/// Response from HTTP request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub duration_ms: u64,
}

impl Response {
    pub fn class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }
}
