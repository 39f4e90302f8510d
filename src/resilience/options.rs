// src/resilience/options.rs

//! Retry policy for the error handler.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::AppError;
use crate::models::RetryConfig;

/// Decides whether a failed attempt should be retried.
///
/// Receives the error and the 1-based number of the attempt that failed.
pub type RetryPredicate = Arc<dyn Fn(&AppError, u32) -> bool + Send + Sync>;

/// Upper bound of the random jitter, as a fraction of the computed delay.
pub const JITTER_RATIO: f64 = 0.1;

/// Exponential backoff settings.
#[derive(Clone)]
pub struct RetryOptions {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub should_retry: RetryPredicate,
}

impl RetryOptions {
    /// Run once, never retry.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&AppError, u32) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// Delay before the next attempt, without jitter:
    /// `min(base * factor^(attempt - 1), max)`.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1) as i32;
        let millis = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Backoff plus up to 10% random jitter.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        let delay = self.backoff(failed_attempt);
        let jitter_ceiling = (delay.as_millis() as f64 * JITTER_RATIO) as u64;
        if jitter_ceiling == 0 {
            return delay;
        }
        let jitter = rand::rng().random_range(0..=jitter_ceiling);
        delay + Duration::from_millis(jitter)
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryOptions {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_factor: config.backoff_factor,
            should_retry: Arc::new(|error: &AppError, _| error.is_retryable()),
        }
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let options = RetryOptions::default();
        assert_eq!(options.backoff(1), Duration::from_millis(1_000));
        assert_eq!(options.backoff(2), Duration::from_millis(2_000));
        assert_eq!(options.backoff(3), Duration::from_millis(4_000));
        assert_eq!(options.backoff(5), Duration::from_millis(10_000));
        assert_eq!(options.backoff(30), Duration::from_millis(10_000));
    }

    #[test]
    fn test_jitter_within_ten_percent() {
        let options = RetryOptions::default();
        for _ in 0..100 {
            let delay = options.delay_for(2);
            assert!(delay >= Duration::from_millis(2_000));
            assert!(delay <= Duration::from_millis(2_200));
        }
    }

    #[test]
    fn test_default_predicate() {
        let options = RetryOptions::default();
        assert!((options.should_retry)(&AppError::http(503, "unavailable"), 1));
        assert!((options.should_retry)(&AppError::network("reset"), 1));
        assert!(!(options.should_retry)(&AppError::http(401, "Unauthorized"), 1));
    }
}
