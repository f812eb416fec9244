//! Text shaping between raw exchanges and what the binder renders.

use std::collections::HashMap;

use shared::error::ValidationWarning;

pub const PREVIEW_MAX_CHARS: usize = 200;

/// Parses `Name: value` lines. Blank lines are skipped; a non-blank line
/// without a colon is skipped and reported as a warning instead of failing
/// the submission.
pub fn parse_header_lines(raw: &str) -> (HashMap<String, String>, Vec<ValidationWarning>) {
    let mut headers = HashMap::new();
    let mut warnings = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => warnings.push(ValidationWarning::MalformedHeader {
                line: line.to_string(),
            }),
        }
    }
    (headers, warnings)
}

/// First 200 characters of the raw body with newlines collapsed to spaces.
pub fn preview_text(body: &str) -> String {
    body.chars()
        .take(PREVIEW_MAX_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// Bodies that parse as JSON are re-serialized indented; anything else is
/// passed through untouched.
pub fn format_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Response headers rendered as an indented JSON object, later pairs winning
/// on duplicate names.
pub fn format_headers(headers: &[(String, String)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::to_string_pretty(&serde_json::Value::Object(map)).unwrap_or_default()
}
