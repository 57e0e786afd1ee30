// ABOUTME: Fixed-delay retry policy for collaborator calls.
// ABOUTME: Only transient errors are retried; everything else is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::HarvestError;

/// Max attempts and the pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A single attempt, no retries.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Document and detail fetches: one retry after a short pause.
    pub const fn fetch_default() -> Self {
        Self::new(2, Duration::from_secs(3))
    }

    /// Table writes under contention.
    pub const fn persist_default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }

    /// Runs `operation` until it succeeds, fails with a non-transient error,
    /// or the attempts are used up.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut operation: F) -> Result<T, HarvestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HarvestError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(
                        op = op_name,
                        attempt,
                        max_attempts,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fetch_default()
    }
}
