//! Response formatting for display

use std::fmt;

use colored::{ColoredString, Colorize};

use crate::models::{Response, StatusClass};

/// `200 OK · 12 ms`, coloured by status class
pub fn status_badge(response: &Response) -> ColoredString {
    let text = status_line(response);
    match response.class() {
        StatusClass::Success => text.green().bold(),
        StatusClass::ClientError | StatusClass::ServerError => text.red().bold(),
        StatusClass::Neutral => text.yellow().bold(),
    }
}

pub fn status_line(response: &Response) -> String {
    let reason = if response.status_text.is_empty() {
        String::new()
    } else {
        format!(" {}", response.status_text)
    };
    format!("{}{} · {} ms", response.status, reason, response.duration_ms)
}

/// Execution figures a script host reports inside its JSON reply
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeStats {
    pub execution_time_ms: f64,
    pub memory_used_mb: f64,
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Execution time: {:.2} ms · Memory: {:.2} MB",
            self.execution_time_ms, self.memory_used_mb
        )
    }
}

/// Read `executionTime` and `memoryUsed` from a JSON object body.
///
/// `None` unless at least one of them is a number; a missing one reads as 0.
pub fn runtime_stats(body: &str) -> Option<RuntimeStats> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = json.as_object()?;
    let execution_time = object.get("executionTime").and_then(|v| v.as_f64());
    let memory_used = object.get("memoryUsed").and_then(|v| v.as_f64());
    if execution_time.is_none() && memory_used.is_none() {
        return None;
    }
    Some(RuntimeStats {
        execution_time_ms: execution_time.unwrap_or(0.0),
        memory_used_mb: memory_used.unwrap_or(0.0),
    })
}

/// Runtime stats when the script reported any, headers, a blank line, then
/// the body.
///
/// Bodies that parse as JSON are pretty-printed; anything else is shown as
/// received.
pub fn format_response(response: &Response) -> String {
    let mut out = String::new();
    if let Some(stats) = runtime_stats(&response.body) {
        out.push_str(&format!("{}\n", stats));
    }
    for (key, value) in &response.headers {
        out.push_str(&format!("{}: {}\n", key, value));
    }
    out.push('\n');
    out.push_str(&pretty_body(&response.body));
    out
}

fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}
