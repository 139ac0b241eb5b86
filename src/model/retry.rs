use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::constants::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};

/// Exponential backoff with jitter applied to the growth factor.
///
/// The first wait is `base_delay`; each later wait is the previous one times
/// `backoff_factor + U(0, jitter)`, never longer than `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Ceiling for any single wait.
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub jitter: f64,
}

impl RetryPolicy {
    pub const DEFAULT_JITTER: f64 = 1.0;

    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    fn grow(&self, delay: Duration) -> Duration {
        let jitter = if self.jitter > 0.0 {
            rand::rng().random_range(0.0..self.jitter)
        } else {
            0.0
        };
        let secs = delay.as_secs_f64() * (self.backoff_factor + jitter);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            jitter: Self::DEFAULT_JITTER,
        }
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` calls have failed.
///
/// Any error is retried. When attempts run out the last error is returned
/// unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.base_delay.min(policy.max_delay);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    warn!(attempt, max_attempts, error = %err, "giving up");
                    return Err(err);
                }
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = policy.grow(delay);
            }
        }
    }
}
