//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::api::ApiError;

/// Runs `op` until it succeeds or the retry policy says to stop.
/// On a retryable failure, sleeps for the backoff delay, then tries again.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            operation = label,
                            attempt,
                            delay_ms = d.as_millis() as u64,
                            "retrying after error: {}",
                            e
                        );
                        tokio::time::sleep(d).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn one_retry_then_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let out = run_with_retry(&fast(2), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiError::Network {
                    message: "blip".into(),
                })
            } else {
                Ok(7)
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 7);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = run_with_retry(&fast(2), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ApiError::Server {
                status: 502,
                message: "bad gateway".into(),
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_fails_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _ = run_with_retry(&fast(5), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ApiError::Auth {
                message: "nope".into(),
            })
        })
        .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
