//! One retry policy for every outbound call.

use std::future::Future;
use std::time::Duration;

use powerzip_core::{ResolveError, ResolveResult};
use tracing::{debug, warn};

/// Exponential backoff over retryable [`ResolveError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            multiplier: 2,
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            multiplier: 1,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// attempts run out. The last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> ResolveResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResolveResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.retryable() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(operation, attempt, error = %e, ?delay, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(operation, attempt, error = %e, "giving up");
                    return Err(e);
                }
            }
        }
    }
}

/// Bound a call by `limit`, turning a hang into a retryable [`ResolveError::Timeout`].
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> ResolveResult<T>
where
    Fut: Future<Output = ResolveResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ResolveError::Timeout(limit)),
    }
}
