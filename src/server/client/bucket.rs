//! Token bucket rate limiting for provider calls.
//!
//! Each access token gets its own bucket sized to the provider's documented budget. Callers
//! that find the bucket empty are suspended until a token refills instead of failing.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::time::Instant;

use crate::server::credential::AccessToken;

/// A refilling budget of requests.
///
/// Starts full. Refills continuously at `refill_per_sec` up to `capacity`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Creates a full bucket.
    ///
    /// # Arguments
    /// - `capacity` - Maximum burst size, at least 1
    /// - `refill_per_sec` - Tokens added per second, non-positive values fall back to 1/sec
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        let capacity = capacity.max(1) as f64;
        let refill_per_sec = if refill_per_sec.is_finite() && refill_per_sec > 0.0 {
            refill_per_sec
        } else {
            1.0
        };

        Self {
            capacity,
            refill_per_sec,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Creates a bucket refilling `per_minute` tokens every minute.
    pub fn per_minute(capacity: u32, per_minute: u32) -> Self {
        Self::new(capacity, per_minute as f64 / 60.0)
    }

    /// Takes a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.reserve().is_ok()
    }

    /// Takes a token, waiting for the bucket to refill when it is empty.
    pub async fn acquire(&self) {
        while let Err(wait) = self.reserve() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Takes a token or returns how long until the next one refills.
    fn reserve(&self) -> Result<(), Duration> {
        let mut state = self.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            return Ok(());
        }

        let deficit = 1.0 - state.tokens;
        let wait = Duration::from_secs_f64(deficit / self.refill_per_sec);

        Err(wait.max(Duration::from_millis(1)))
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        // The critical section cannot panic, recover the guard if it ever does.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registry of token buckets, one per access token.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    capacity: u32,
    refill_per_sec: f64,
    buckets: Arc<Mutex<HashMap<AccessToken, Arc<TokenBucket>>>>,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the bucket shared by every call made with `token`.
    pub fn bucket(&self, token: &AccessToken) -> Arc<TokenBucket> {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        buckets
            .entry(token.clone())
            .or_insert_with(|| Arc::new(TokenBucket::new(self.capacity, self.refill_per_sec)))
            .clone()
    }
}
