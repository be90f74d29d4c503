//! Canonical job identity.
//!
//! Job documents name their identifier `job_id`, `_id` or `id` depending on the
//! endpoint. This module is the only place that knows those keys; everything else
//! works with a resolved [`JobId`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::BulkError;

/// Keys checked for a job identifier, highest priority first.
pub const JOB_ID_KEYS: [&str; 3] = ["job_id", "_id", "id"];

/// Server-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.trim().to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId::from(s.as_str())
    }
}

/// Non-empty identifier under `key`. Strings are trimmed; integers are rendered in decimal.
pub(crate) fn id_field(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Return the first non-empty identifier among `job_id`, `_id`, `id`.
pub fn resolve_id(job_like: &Value) -> Option<JobId> {
    JOB_ID_KEYS
        .iter()
        .find_map(|key| id_field(job_like, key))
        .map(JobId)
}

/// Like [`resolve_id`] but fails with `MissingJobIdentity`.
pub fn require_id(job_like: &Value) -> Result<JobId, BulkError> {
    resolve_id(job_like).ok_or(BulkError::MissingJobIdentity)
}
