use std::time::Duration;

use super::provider::ProviderError;

/// Strategy for handling errors in a retry context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (network errors, provider 5xx)
    Retry,
    /// Retry after the provider supplied delay, or backoff if it gave none (throttling)
    RetryAfter(Option<Duration>),
    /// Failed permanently (bad request, bad token, malformed payload)
    Fail,
}

impl ProviderError {
    /// Determine retry strategy for a single failed provider attempt
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            // 429 - Provider is throttling this token, honour its hint
            Self::RateLimitExceeded { retry_after, .. } => {
                ErrorRetryStrategy::RetryAfter(*retry_after)
            }

            // Connection errors, timeouts and 5xx are expected to clear up
            Self::TransientNetworkError { .. } => ErrorRetryStrategy::Retry,

            // 4xx - We're sending an invalid request or a revoked token, retrying
            // will only burn rate limit budget.
            Self::ClientRequestError { .. } => ErrorRetryStrategy::Fail,

            // The provider answered but with a payload we can't read, the same
            // request will produce the same payload.
            Self::InvalidResponse { .. } => ErrorRetryStrategy::Fail,
        }
    }
}
