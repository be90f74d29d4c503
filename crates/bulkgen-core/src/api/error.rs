//! API error taxonomy and human-readable message extraction from error bodies.

use serde_json::Value;
use std::fmt::Write as _;

/// One entry of a structured validation error (`detail: [{loc, msg}, ...]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted location, e.g. `body.num_articles`.
    pub location: String,
    pub message: String,
}

/// Error returned by the HTTP adapter. Every variant carries a message fit for the operator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response at all (DNS, connect, timeout, reset).
    #[error("network error: {message}")]
    Network { message: String },
    /// HTTP 401.
    #[error("authentication failed: {message}")]
    Auth { message: String },
    /// HTTP 404.
    #[error("not found: {message}")]
    NotFound { message: String },
    /// Any other 4xx; `fields` is filled when the server sent a structured list.
    #[error("request rejected (HTTP {status}): {message}")]
    Validation {
        status: u32,
        message: String,
        fields: Vec<FieldError>,
    },
    /// HTTP 5xx.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u32, message: String },
    /// A success response whose body was not the JSON the endpoint promises.
    #[error("unexpected response: {message}")]
    Decode { message: String },
    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },
}

impl ApiError {
    /// HTTP status behind this error, when there was a response.
    pub fn status(&self) -> Option<u32> {
        match self {
            ApiError::Auth { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Validation { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Decode { .. } | ApiError::InvalidUrl { .. } => {
                None
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message }
            | ApiError::Auth { message }
            | ApiError::NotFound { message }
            | ApiError::Validation { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::Decode { message }
            | ApiError::InvalidUrl { message } => message,
        }
    }

    /// Map a non-2xx response to the taxonomy.
    pub(crate) fn from_status(status: u32, body: &[u8]) -> Self {
        let (message, fields) = extract_message(status, body);
        match status {
            401 => ApiError::Auth { message },
            404 => ApiError::NotFound { message },
            400..=499 => ApiError::Validation {
                status,
                message,
                fields,
            },
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Decode {
                message: format!("unexpected HTTP {}: {}", status, message),
            },
        }
    }
}

/// Longest plain-text body we are willing to show as an error message.
const MAX_TEXT_MESSAGE: usize = 300;

/// Pull a readable message out of an error body.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"loc": [...], "msg": "..."}]}` and
/// `{"message": "..."}`; short plain-text bodies are used as-is.
pub(crate) fn extract_message(status: u32, body: &[u8]) -> (String, Vec<FieldError>) {
    let fallback = || format!("HTTP {}", status);

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if !text.is_empty() && text.len() <= MAX_TEXT_MESSAGE && !text.starts_with('<') {
                return (text.to_string(), Vec::new());
            }
            return (fallback(), Vec::new());
        }
    };

    match value.get("detail") {
        Some(Value::String(s)) if !s.trim().is_empty() => return (s.trim().to_string(), Vec::new()),
        Some(Value::Array(items)) => {
            let fields: Vec<FieldError> = items.iter().filter_map(field_error).collect();
            if !fields.is_empty() {
                return (join_fields(&fields), fields);
            }
        }
        Some(Value::Object(_)) => {
            if let Some(fe) = value.get("detail").and_then(field_error) {
                return (join_fields(std::slice::from_ref(&fe)), vec![fe]);
            }
        }
        _ => {}
    }

    match value.get("message").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => (s.trim().to_string(), Vec::new()),
        _ => (fallback(), Vec::new()),
    }
}

fn field_error(item: &Value) -> Option<FieldError> {
    let message = item.get("msg").and_then(Value::as_str)?.trim().to_string();
    let location = match item.get("loc") {
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| match p {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("."),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    Some(FieldError { location, message })
}

fn join_fields(fields: &[FieldError]) -> String {
    let mut out = String::new();
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        if f.location.is_empty() {
            out.push_str(&f.message);
        } else {
            let _ = write!(out, "{}: {}", f.location, f.message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_used() {
        let (msg, fields) = extract_message(400, br#"{"detail": "Topic is required"}"#);
        assert_eq!(msg, "Topic is required");
        assert!(fields.is_empty());
    }

    #[test]
    fn detail_list_is_flattened() {
        let body = br#"{"detail": [
            {"loc": ["body", "num_articles"], "msg": "ensure this value is greater than 0", "type": "value_error"},
            {"loc": ["body", "topic"], "msg": "field required"}
        ]}"#;
        let (msg, fields) = extract_message(422, body);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].location, "body.num_articles");
        assert_eq!(
            msg,
            "body.num_articles: ensure this value is greater than 0; body.topic: field required"
        );
    }

    #[test]
    fn message_key_and_plain_text() {
        let (msg, _) = extract_message(500, br#"{"message": "database unavailable"}"#);
        assert_eq!(msg, "database unavailable");
        let (msg, _) = extract_message(502, b"Bad Gateway");
        assert_eq!(msg, "Bad Gateway");
        let (msg, _) = extract_message(502, b"<html><body>nginx</body></html>");
        assert_eq!(msg, "HTTP 502");
        let (msg, _) = extract_message(500, b"");
        assert_eq!(msg, "HTTP 500");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(ApiError::from_status(401, b""), ApiError::Auth { .. }));
        assert!(matches!(ApiError::from_status(404, b""), ApiError::NotFound { .. }));
        assert!(matches!(
            ApiError::from_status(422, b"{}"),
            ApiError::Validation { status: 422, .. }
        ));
        assert!(matches!(
            ApiError::from_status(503, b""),
            ApiError::Server { status: 503, .. }
        ));
        let e = ApiError::from_status(404, br#"{"detail": "Job not found"}"#);
        assert_eq!(e.message(), "Job not found");
        assert_eq!(e.status(), Some(404));
    }
}
