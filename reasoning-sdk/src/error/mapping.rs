//! Mapping of HTTP error responses to `BackendError`
//!
//! OpenAI-compatible services answer failures with a body of the form
//! `{"error": {"message": "...", "type": "...", "code": ...}}`. Some
//! gateways (including the Gemini compatibility surface) wrap the payload in
//! a one-element array.

use reqwest::StatusCode;
use serde_json::Value;

use super::{BackendError, BackendFailureKind};

/// Longest body excerpt carried into an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Map an HTTP error status and body to a BackendError
pub fn map_http_error(status: StatusCode, body: &str) -> BackendError {
    let message = extract_error_message(body).unwrap_or_else(|| fallback_message(status, body));

    BackendError::new(classify_http_error(status), message).with_status(status.as_u16())
}

/// Classify an HTTP error status into a failure kind
pub fn classify_http_error(status: StatusCode) -> BackendFailureKind {
    match status.as_u16() {
        401 | 403 => BackendFailureKind::Authentication,
        408 | 504 => BackendFailureKind::Timeout,
        429 => BackendFailureKind::RateLimit,
        _ => BackendFailureKind::Service,
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let json = match json {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };

    let error = json.get("error").unwrap_or(&json);
    match error {
        Value::String(message) => Some(message.clone()),
        _ => error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else if body.chars().count() > MAX_BODY_EXCERPT {
        let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}: {}...", status, excerpt)
    } else {
        format!("{}: {}", status, body)
    }
}
