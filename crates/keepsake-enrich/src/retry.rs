//! Bounded retry with exponential backoff for external calls.

use std::future::Future;
use std::time::Duration;

use crate::EnrichError;

/// Retry tuning for one class of external call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` under `policy`.
///
/// Rate-limit/unavailable errors are retried with a doubling delay;
/// authorization failures propagate immediately; exhausting the budget on
/// a retryable error returns `RetriesExhausted` wrapping the last error.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, EnrichError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnrichError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                tracing::warn!(operation, attempt, error = %e, "Enrichment call failed (terminal)");
                return Err(e);
            }
            Err(e) => {
                if attempt >= policy.max_attempts {
                    tracing::warn!(
                        operation,
                        attempts = attempt,
                        error = %e,
                        "Enrichment call failed after exhausting retries"
                    );
                    return Err(EnrichError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }

                tracing::debug!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Enrichment call failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_rate_limits_with_doubling_delays() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = with_retry(policy(), "analyze", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(EnrichError::RateLimited)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s then 2s of backoff under the paused clock.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(policy(), "analyze", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(EnrichError::Unauthorized("bad key".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(EnrichError::Unauthorized(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(policy(), "generate", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(EnrichError::Unavailable("overloaded".to_string())) }
        })
        .await;

        match result {
            Err(EnrichError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, EnrichError::Unavailable(_)));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_sleeps_nothing() {
        let start = Instant::now();
        let result = with_retry(policy(), "analyze", || async { Ok(1) }).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
