//! Harness configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DATA_DIR_NAME, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Deployment-level settings for one harness instance
#[derive(Clone, Debug, PartialEq)]
pub struct HarnessConfig {
    pub base_url: String,
    /// `None` waits for the server indefinitely
    pub timeout: Option<Duration>,
    /// Reject paths with `..` or characters outside the safe set before sending
    pub validate_path: bool,
    /// Reject malformed JSON bodies when the content type is JSON
    pub validate_json_body: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            validate_path: true,
            validate_json_body: false,
        }
    }
}

/// Directory holding persisted snapshots and the log file
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}
