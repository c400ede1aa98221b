//! Bounded retry for transport timeouts.

use crate::error::{ImageForgeError, Result};
use std::future::Future;
use std::time::Duration;

/// Runs `operation` until it returns a non-timeout outcome, retrying timed-out
/// attempts up to `max_retries` additional times.
///
/// Only timeouts are retried; any other error (HTTP error status, decode
/// failure, connection reset) propagates immediately. Attempts are strictly
/// sequential, with a delay of 2^attempt seconds (2s, 4s, 8s) between them.
/// When the budget is exhausted the caller gets `TimeoutExceeded` with the
/// total attempt count.
pub(crate) async fn with_timeout_retry<T, F, Fut>(max_retries: u32, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_timeout() => {
                attempt += 1;
                if attempt > max_retries {
                    tracing::error!(
                        attempts = attempt,
                        error = %e,
                        "request failed after exhausting retry budget"
                    );
                    return Err(ImageForgeError::TimeoutExceeded {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                let delay = Duration::from_secs(2u64.pow(attempt));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs = delay.as_secs(),
                    "request timed out, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn timeout_err() -> ImageForgeError {
        ImageForgeError::RequestTimeout("read timed out".into())
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_timeout_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds_with_backoff() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = with_timeout_retry(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(timeout_err())
                } else {
                    Ok("done")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two timeouts: slept 2s then 4s before the third attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted_after_four_attempts() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<()> = with_timeout_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(timeout_err()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // Delays of 2s, 4s, 8s were taken between the four attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(14));
        match result {
            Err(ImageForgeError::TimeoutExceeded {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 4);
                assert!(last_error.contains("read timed out"));
            }
            other => panic!("expected TimeoutExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_timeout_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_timeout_retry(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ImageForgeError::Api {
                    status: 500,
                    body: "server error".into(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ImageForgeError::Api { status: 500, .. })
        ));
    }
}
