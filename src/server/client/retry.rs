//! Retry and backoff policy for provider calls.

use std::time::Duration;

use rand::Rng;

use crate::server::error::retry::ErrorRetryStrategy;

/// Upper bound applied to provider supplied `Retry-After` hints.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Bounded exponential backoff with optional jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Randomize each delay between half and all of its computed value
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy retrying without any delay.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Exponential delay before retrying after the given failed attempt (1-based), without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        let max = self.max_delay.as_secs_f64();

        Duration::from_secs_f64(if secs.is_finite() { secs.min(max) } else { max })
    }

    /// Delay to wait before the next attempt.
    ///
    /// Throttling with a `Retry-After` hint waits for the hint (capped at
    /// [`MAX_RETRY_AFTER`]); everything else uses jittered exponential backoff.
    pub fn delay_for(&self, attempt: u32, strategy: ErrorRetryStrategy) -> Duration {
        match strategy {
            ErrorRetryStrategy::RetryAfter(Some(hint)) => hint.min(MAX_RETRY_AFTER),
            _ => self.jittered(self.backoff(attempt)),
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let half = delay / 2;
        let extra = rand::rng().random_range(0..=half.as_millis() as u64);
        half + Duration::from_millis(extra)
    }
}
