//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Base URL used when no deployment URL is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment variable that overrides the base URL
pub const BASE_URL_ENV: &str = "SCRIPTPROBE_BASE_URL";

/// Content type of a freshly created request
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Body of a freshly created request
pub const DEFAULT_BODY: &str = "{}";

/// Prefix of every persisted request snapshot key
pub const STORAGE_KEY_PREFIX: &str = "test-request-";

/// Per-request timeout applied unless configured otherwise
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory (under the home directory) holding snapshots and logs
pub const DATA_DIR_NAME: &str = ".scriptprobe";

/// Log file written by the binary
pub const LOG_FILE_NAME: &str = "scriptprobe.log";

/// Application name
pub const APP_NAME: &str = "scriptprobe";
