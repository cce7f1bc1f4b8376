//! URL construction shared by the executor and the curl generator

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::models::KeyValue;

/// Build the canonical request URL.
///
/// `base_url/project/path?query`, with empty segments dropped so no slash is
/// ever doubled, every segment and query component percent-encoded, and the
/// query string present only when a non-blank parameter survives.
pub fn build_url(base_url: &str, project: &str, path: &str, query_params: &[KeyValue]) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();

    for segment in project.split('/').chain(path.split('/')) {
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(&encode_component(segment));
    }

    let query = query_string(query_params);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    url
}

fn query_string(query_params: &[KeyValue]) -> String {
    query_params
        .iter()
        .filter(|p| !p.is_blank())
        .map(|p| {
            format!(
                "{}={}",
                encode_component(&p.key),
                encode_component(&p.value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode like `encodeURIComponent`: alphanumerics and
/// `-_.!~*'()` pass through, everything else is UTF-8 percent-encoded.
pub fn encode_component(s: &str) -> String {
    // urlencoding keeps only `-_.~`; a literal `%` is always re-encoded as
    // `%25`, so these sequences can only come from the five marks
    urlencoding::encode(s)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

/// Reject endpoint paths that could escape the project or need encoding
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    static SAFE_PATH: OnceLock<Regex> = OnceLock::new();
    let safe_path = SAFE_PATH.get_or_init(|| Regex::new(r"^[A-Za-z0-9._~/\-]*$").unwrap());

    if path.contains("..") {
        return Err(ValidationError::ParentReference);
    }
    if !safe_path.is_match(path) {
        return Err(ValidationError::DisallowedCharacters(path.to_string()));
    }
    Ok(())
}
