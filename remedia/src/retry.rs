//! Bounded exponential backoff for calls to remote providers.
//!
//! Both the classification call and the embedding call go through
//! [`with_retry`]. Only errors reporting
//! [`crate::error::RemediaError::is_transient`] are retried; everything else
//! is returned on the spot.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::config::RetryConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub randomization_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: config.initial_delay(),
            max_delay: config.max_delay(),
            randomization_factor: config.randomization_factor,
        }
    }
}

impl RetryPolicy {
    /// Policy with millisecond delays, for tests and local providers.
    pub fn fast(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            randomization_factor: 0.5,
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(self.randomization_factor.clamp(0.0, 1.0))
            .with_max_elapsed_time(None)
            .build()
    }

    /// Delays that would be slept between consecutive attempts.
    pub fn delays(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (1..self.max_attempts.max(1))
            .map(|_| self.next_delay(&mut backoff))
            .collect()
    }

    fn next_delay(&self, backoff: &mut ExponentialBackoff) -> Duration {
        // jitter may push the randomized interval above the configured ceiling
        backoff
            .next_backoff()
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails permanently, or `max_attempts` is reached.
///
/// The error of the last attempt is returned after exhaustion; no attempt is
/// made beyond `max_attempts`.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.backoff();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(label, attempt, "Provider call recovered after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() && attempt < max_attempts => {
                let delay = policy.next_delay(&mut backoff);
                tracing::warn!(
                    label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient provider failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                if error.is_transient() {
                    tracing::error!(
                        label,
                        attempts = attempt,
                        error = %error,
                        "Provider call failed after exhausting retries"
                    );
                }
                return Err(error);
            }
        }
    }
}
