//! Classify adapter errors into retry policy error kinds.

use crate::api::ApiError;
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify an adapter error. Auth, not-found and validation failures are never retried.
pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Network { .. } => ErrorKind::Connection,
        ApiError::Server { status, .. } | ApiError::Validation { status, .. } => {
            classify_http_status(*status)
        }
        ApiError::Auth { .. }
        | ApiError::NotFound { .. }
        | ApiError::Decode { .. }
        | ApiError::InvalidUrl { .. } => ErrorKind::Other,
    }
}
