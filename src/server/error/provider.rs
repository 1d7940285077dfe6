use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the rate-limited banking provider client.
///
/// Every `token` field carries the masked hint (first characters followed by `...`),
/// never the full credential.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// 4xx response other than throttling; never retried.
    #[error(
        "Provider rejected request with status {status} (code: {}) using token {token}: {message}",
        .code.as_deref().unwrap_or("none")
    )]
    ClientRequestError {
        status: u16,
        code: Option<String>,
        message: String,
        token: String,
    },
    /// Provider kept throttling after every retry attempt.
    #[error("Provider rate limit exceeded after {attempts} attempt(s) using token {token}")]
    RateLimitExceeded {
        attempts: u32,
        retry_after: Option<Duration>,
        token: String,
    },
    /// Network failure or 5xx response that persisted through every retry attempt.
    #[error("Provider unavailable after {attempts} attempt(s) using token {token}: {reason}")]
    TransientNetworkError {
        attempts: u32,
        reason: String,
        token: String,
    },
    /// Payload did not match the expected shape.
    #[error("Invalid provider response for {context}: {reason}")]
    InvalidResponse { context: String, reason: String },
}

impl ProviderError {
    /// Records the number of attempts made once retries are exhausted
    pub fn with_attempts(self, total: u32) -> Self {
        match self {
            Self::RateLimitExceeded {
                retry_after, token, ..
            } => Self::RateLimitExceeded {
                attempts: total,
                retry_after,
                token,
            },
            Self::TransientNetworkError { reason, token, .. } => Self::TransientNetworkError {
                attempts: total,
                reason,
                token,
            },
            other => other,
        }
    }

    /// Short stable label used in sync outcomes and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientRequestError { .. } => "client_request_error",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::TransientNetworkError { .. } => "transient_network_error",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}
