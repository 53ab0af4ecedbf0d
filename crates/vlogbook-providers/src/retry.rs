//! Retry with exponential backoff for provider calls.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::error::ProviderError;

/// Upper bound for a single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// How many times to retry a failed provider call, and how long to wait.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled after each one.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

/// Run `op` until it succeeds, the error is permanent, or retries run out.
///
/// A `RateLimited` error replaces the next delay with the server's hint.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.initial_delay;
    let mut retry = 0;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let provider_err = err.downcast_ref::<ProviderError>();
        if provider_err.is_some_and(ProviderError::is_permanent) || retry >= policy.max_retries {
            return Err(err);
        }
        if let Some(ms) = provider_err.and_then(ProviderError::retry_after_ms) {
            delay = Duration::from_millis(ms).min(MAX_DELAY);
        }

        retry += 1;
        tracing::warn!(
            retry,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            "{what} failed: {err:#}"
        );
        tokio::time::sleep(delay).await;
        delay = delay.saturating_mul(2).min(MAX_DELAY);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(100));

        let value = with_retry(&policy, "generate", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(anyhow::Error::from(ProviderError::NetworkError("reset".into())))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let err = with_retry(&policy, "generate", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), anyhow::Error>(
                    ProviderError::AuthenticationFailed("bad key".into()).into(),
                )
            }
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("authentication"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        let err = with_retry(&policy, "speak", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), anyhow::Error>(
                    ProviderError::RateLimited {
                        retry_after_ms: 50,
                    }
                    .into(),
                )
            }
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("rate limited"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_hint_is_capped() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(1, Duration::from_millis(10));
        let start = tokio::time::Instant::now();

        let value = with_retry(&policy, "generate", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(anyhow::Error::from(ProviderError::RateLimited {
                        retry_after_ms: u64::MAX,
                    }))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 1);
        assert!(start.elapsed() <= MAX_DELAY);
    }

    #[tokio::test]
    async fn no_retry_policy_runs_once() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::none(), "generate", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), anyhow::Error>(anyhow::anyhow!("boom")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
