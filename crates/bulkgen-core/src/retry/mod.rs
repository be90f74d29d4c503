//! Caller-side retry and backoff policy.
//!
//! The HTTP adapter never retries on its own. Operations that are allowed to
//! retry (brainstorm) classify the adapter error and ask the policy whether and
//! when to try again.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
