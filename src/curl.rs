//! curl command generation and parsing.
//!
//! The generated command reproduces a `PreparedRequest` byte for byte when run
//! in a POSIX shell with ANSI-C quoting (`bash`, `zsh`). The parser is its
//! inverse and is used to check that reproduction.

use anyhow::{anyhow, bail, Result};

use crate::models::{HttpMethod, PreparedRequest, RequestSpec};
use crate::network::client::prepare_request;

const CONTINUATION: &str = " \\\n  ";

/// Curl command for `spec` sent to `url`
pub fn generate(spec: &RequestSpec, url: &str) -> String {
    to_curl(&prepare_request(spec, url))
}

/// Format a prepared request as a curl command
pub fn to_curl(request: &PreparedRequest) -> String {
    let mut parts = vec![
        format!("curl -X {}", request.method.as_str()),
        quote_double(&request.url),
    ];

    for (key, value) in &request.headers {
        parts.push(format!("-H {}", quote_header(&format!("{}: {}", key, value))));
    }

    // --data-raw so a leading '@' is never read as a file name
    if let Some(body) = &request.body {
        parts.push(format!("--data-raw $'{}'", escape_ansi_c(body)));
    }

    parts.join(CONTINUATION)
}

/// Headers with control characters fall back to `$'...'` so the command
/// keeps its line structure
fn quote_header(line: &str) -> String {
    if line.chars().any(|c| c.is_control()) {
        format!("$'{}'", escape_ansi_c(line))
    } else {
        quote_double(line)
    }
}

/// Wrap in double quotes, escaping what the shell would expand
fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Escape text for a `$'...'` argument.
///
/// Every control character becomes a visible escape so the command stays one
/// logical line.
pub fn escape_ansi_c(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_ansi_c`]
pub fn unescape_ansi_c(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let code = u8::from_str_radix(&hex, 16)
                    .map_err(|_| anyhow!("Invalid \\x escape: {:?}", hex))?;
                out.push(char::from(code));
            }
            Some(other) => bail!("Unsupported escape: \\{}", other),
            None => bail!("Dangling backslash"),
        }
    }
    Ok(out)
}

/// Parse a curl command back into the request it would send
pub fn parse_curl(input: &str) -> Result<PreparedRequest> {
    let tokens = tokenize(input)?;
    let mut tokens = tokens.into_iter().peekable();

    if tokens.peek().map(|s| s.as_str()) == Some("curl") {
        tokens.next();
    }

    let mut method: Option<HttpMethod> = None;
    let mut url: Option<String> = None;
    let mut headers = Vec::new();
    let mut body = None;

    while let Some(token) = tokens.next() {
        match token.as_str() {
            "-X" | "--request" => {
                let value = tokens.next().ok_or_else(|| anyhow!("{} needs a value", token))?;
                method = Some(value.parse::<HttpMethod>()?);
            }
            "-H" | "--header" => {
                let value = tokens.next().ok_or_else(|| anyhow!("{} needs a value", token))?;
                let (key, value) = value
                    .split_once(": ")
                    .ok_or_else(|| anyhow!("Invalid header format: {}", value))?;
                headers.push((key.to_string(), value.to_string()));
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                body = Some(tokens.next().ok_or_else(|| anyhow!("{} needs a value", token))?);
            }
            t if t.starts_with('-') => bail!("Unsupported option: {}", t),
            _ => {
                if url.replace(token.clone()).is_some() {
                    bail!("More than one URL in command");
                }
            }
        }
    }

    Ok(PreparedRequest {
        method: method.ok_or_else(|| anyhow!("Missing -X"))?,
        url: url.ok_or_else(|| anyhow!("Missing URL"))?,
        headers,
        body,
    })
}

/// Split a command into words the way a POSIX shell would for the quoting
/// forms `to_curl` emits: bare words, '...', "...", $'...' and line
/// continuations.
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(escaped) => current.get_or_insert_with(String::new).push(escaped),
                None => bail!("Dangling backslash"),
            },
            '\'' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => bail!("Unterminated single quote"),
                    }
                }
            }
            '$' if chars.peek() == Some(&'\'') => {
                chars.next();
                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => {
                            raw.push('\\');
                            raw.push(chars.next().ok_or_else(|| anyhow!("Unterminated $'"))?);
                        }
                        Some('\'') => break,
                        Some(ch) => raw.push(ch),
                        None => bail!("Unterminated $'"),
                    }
                }
                current
                    .get_or_insert_with(String::new)
                    .push_str(&unescape_ansi_c(&raw)?);
            }
            '"' => {
                let word = current.get_or_insert_with(String::new);
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(ch @ ('\\' | '"' | '$' | '`')) => word.push(ch),
                            Some('\n') => {}
                            Some(ch) => {
                                word.push('\\');
                                word.push(ch);
                            }
                            None => bail!("Unterminated double quote"),
                        },
                        Some('"') => break,
                        Some(ch) => word.push(ch),
                        None => bail!("Unterminated double quote"),
                    }
                }
            }
            ' ' | '\t' | '\n' => {
                if let Some(word) = current.take() {
                    tokens.push(word);
                }
            }
            _ => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(word) = current {
        tokens.push(word);
    }

    Ok(tokens)
}
