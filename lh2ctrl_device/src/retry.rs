use std::{future::Future, time::Duration};
use tokio::time;

/// Classifies whether an error is worth another attempt.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Connection attempt policy: `count` attempts total with a fixed `pause`
/// between them. The pause is constant, not a backoff.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub count: u32,
    pub pause: Duration,
}

impl RetryPolicy {
    pub const fn new(count: u32, pause: Duration) -> Self {
        Self { count, pause }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: 5,
            pause: Duration::from_secs(2),
        }
    }
}

/// Runs `op` until it succeeds or the policy is exhausted.
///
/// Only retryable errors are retried; the final attempt's error is returned
/// unmodified. Terminal errors are returned immediately regardless of the
/// remaining attempt budget. A count of 1 means zero retries.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = policy.count.max(1);
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if remaining > 1 && err.is_retryable() => {
                remaining -= 1;
                tracing::warn!("attempt failed ({remaining} tries left): {err}");
                time::sleep(policy.pause).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{with_retry, RetryPolicy, Retryable};
    use std::{cell::Cell, time::Duration};
    use thiserror::Error;
    use tokio::time::Instant;

    #[derive(Debug, Error)]
    #[error("test error #{attempt}")]
    struct TestError {
        attempt: u32,
        retryable: bool,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    fn policy(count: u32) -> RetryPolicy {
        RetryPolicy::new(count, Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_last_attempt_after_four_pauses() {
        let attempts = Cell::new(0u32);
        let started = Instant::now();
        let result = with_retry(policy(5), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                if attempt < 5 {
                    Err(TestError {
                        attempt,
                        retryable: true,
                    })
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 5);
        assert_eq!(attempts.get(), 5);
        // Four pauses of two seconds each, nothing more.
        assert_eq!(started.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_is_never_retried() {
        let attempts = Cell::new(0u32);
        let started = Instant::now();
        let result: Result<(), _> = with_retry(policy(1), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                Err(TestError {
                    attempt,
                    retryable: true,
                })
            }
        })
        .await;
        assert_eq!(result.unwrap_err().attempt, 1);
        assert_eq!(attempts.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_the_final_error() {
        let attempts = Cell::new(0u32);
        let result: Result<(), _> = with_retry(policy(5), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                Err(TestError {
                    attempt,
                    retryable: true,
                })
            }
        })
        .await;
        assert_eq!(result.unwrap_err().attempt, 5);
        assert_eq!(attempts.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_error_propagates_immediately() {
        let attempts = Cell::new(0u32);
        let started = Instant::now();
        let result: Result<(), _> = with_retry(policy(5), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                Err(TestError {
                    attempt,
                    retryable: false,
                })
            }
        })
        .await;
        assert_eq!(result.unwrap_err().attempt, 1);
        assert_eq!(attempts.get(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
