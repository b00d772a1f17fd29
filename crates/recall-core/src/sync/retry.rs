//! Bounded retry for remote writes.

use std::future::Future;

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::models::RecordKind;

/// Run `attempt` until it succeeds, fails with a non-network error, or the
/// policy's attempts are used up.
///
/// Only network failures are retried. When attempts run out the last
/// failure is returned as [`Error::Network`] naming the attempt count.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    kind: RecordKind,
    operation: &str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_network() => return Err(error),
            Err(error) if attempts >= max_attempts => {
                tracing::warn!(
                    kind = %kind,
                    attempts,
                    "Giving up on remote {operation}: {error}"
                );
                let detail = match error {
                    Error::Network(message) => message,
                    other => other.to_string(),
                };
                return Err(Error::Network(format!(
                    "{kind} {operation} failed after {attempts} attempts: {detail}"
                )));
            }
            Err(error) => {
                tracing::warn!(
                    kind = %kind,
                    attempt = attempts,
                    "Remote {operation} failed, retrying in {}ms: {}",
                    policy.delay.as_millis(),
                    error
                );
                tokio::time::sleep(policy.delay).await;
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
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn network_errors_are_retried_until_attempts_run_out() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retry(fast(3), RecordKind::Goals, "create", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Network("connection refused".into()))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let error = result.unwrap_err();
        assert!(error.is_network());
        assert!(error.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn success_after_transient_failure() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(fast(3), RecordKind::Goals, "create", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Network("timed out".into()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retry(fast(5), RecordKind::Decks, "update", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Validation("name is required".into()))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn zero_attempt_policy_still_tries_once() {
        let calls = &AtomicU32::new(0);
        let _ = with_retry(fast(0), RecordKind::Decks, "create", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Error::Network("unreachable".into()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
