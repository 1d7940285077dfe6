//! Rate-limited client for the Mercury banking API.
//!
//! Every call waits on the token bucket of its access token, then is retried according to
//! the [`RetryPolicy`] when the provider throttles or fails transiently. Errors carry only the
//! masked token hint.

pub mod bucket;
pub mod payload;
pub mod retry;

pub use bucket::{RateLimiter, TokenBucket};
pub use retry::RetryPolicy;

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use reqwest::{header::RETRY_AFTER, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::server::{
    credential::AccessToken,
    error::{provider::ProviderError, retry::ErrorRetryStrategy, Error},
    model::provider::{AccountRecord, BalanceRecord, TransactionRecord},
};

use payload::{AccountPayload, AccountsPayload, TransactionsPayload};

/// Connection and throttling settings for [`MercuryClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://api.mercury.com/api/v1`
    pub base_url: String,
    pub request_timeout: Duration,
    /// Burst size of each token bucket
    pub bucket_capacity: u32,
    /// Tokens refilled per second in each token bucket
    pub refill_per_sec: f64,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Settings matching the provider's documented limit of 100 requests per minute per token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
            bucket_capacity: 100,
            refill_per_sec: 100.0 / 60.0,
            retry: RetryPolicy::default(),
        }
    }
}

/// An outbound GET request relative to the provider base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ProviderRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Error payload returned by the provider on 4xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    #[serde(default)]
    errors: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

/// Client for the banking provider, cheap to clone.
#[derive(Clone)]
pub struct MercuryClient {
    inner: Arc<MercuryClientRef>,
}

struct MercuryClientRef {
    http: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl MercuryClient {
    /// Builds the client.
    ///
    /// # Returns
    /// - `Ok(MercuryClient)` - Client ready to issue calls
    /// - `Err(Error::ReqwestError)` - The underlying HTTP client could not be built
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("empire/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(MercuryClientRef {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                limiter: RateLimiter::new(config.bucket_capacity, config.refill_per_sec),
                retry: config.retry,
            }),
        })
    }

    /// Issues a request and decodes its JSON body.
    ///
    /// Waits for a token bucket slot before every attempt. Throttled and transient failures
    /// are retried up to `max_attempts` total attempts; client errors and malformed bodies
    /// fail immediately.
    ///
    /// # Returns
    /// - `Ok(T)` - Decoded response body
    /// - `Err(ProviderError::ClientRequestError)` - Provider rejected the request (4xx)
    /// - `Err(ProviderError::RateLimitExceeded)` - Still throttled after every attempt
    /// - `Err(ProviderError::TransientNetworkError)` - Network or 5xx failure after every attempt
    /// - `Err(ProviderError::InvalidResponse)` - Body was not the expected JSON shape
    pub async fn call<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        request: &ProviderRequest,
    ) -> Result<T, ProviderError> {
        let bucket = self.inner.limiter.bucket(token);
        let max_attempts = self.inner.retry.max_attempts.max(1);
        let mut attempt: u32 = 1;

        loop {
            bucket.acquire().await;

            let err = match self.send_once(token, request).await {
                Ok(body) => {
                    return serde_json::from_str(&body).map_err(|e| {
                        tracing::warn!(path = %request.path, token = %token, "Malformed provider response: {}", e);
                        ProviderError::InvalidResponse {
                            context: format!("GET {}", request.path),
                            reason: e.to_string(),
                        }
                    })
                }
                Err(err) => err,
            };

            let strategy = err.to_retry_strategy();
            if strategy == ErrorRetryStrategy::Fail || attempt >= max_attempts {
                return Err(err.with_attempts(attempt));
            }

            let delay = self.inner.retry.delay_for(attempt, strategy);
            tracing::debug!(
                path = %request.path,
                token = %token,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying provider request: {}",
                err
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Sends a single attempt and classifies the response.
    async fn send_once(
        &self,
        token: &AccessToken,
        request: &ProviderRequest,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/{}",
            self.inner.base_url,
            request.path.trim_start_matches('/')
        );

        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token.expose())
            .query(&request.query)
            .send()
            .await
            .map_err(|e| transient(token, e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|e| transient(token, e.without_url().to_string()));
        }

        Err(classify_failure(token, status, response).await)
    }

    /// Lists the accounts visible to a token.
    pub async fn list_accounts(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<AccountRecord>, ProviderError> {
        let payload: AccountsPayload = self.call(token, &ProviderRequest::get("accounts")).await?;

        payload
            .accounts
            .into_iter()
            .map(AccountPayload::into_record)
            .collect()
    }

    /// Fetches the current balance of an account.
    pub async fn get_balance(
        &self,
        token: &AccessToken,
        account_id: &str,
    ) -> Result<BalanceRecord, ProviderError> {
        let payload: AccountPayload = self
            .call(token, &ProviderRequest::get(format!("account/{account_id}")))
            .await?;

        payload.into_balance()
    }

    /// Fetches the transactions of an account, starting at `since` (inclusive) when given.
    pub async fn list_transactions(
        &self,
        token: &AccessToken,
        account_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TransactionRecord>, ProviderError> {
        let mut request = ProviderRequest::get(format!("account/{account_id}/transactions"));
        if let Some(since) = since {
            request = request.query("start", since.format("%Y-%m-%d").to_string());
        }

        let payload: TransactionsPayload = self.call(token, &request).await?;

        payload
            .transactions
            .into_iter()
            .map(|tx| tx.into_record())
            .collect()
    }
}

fn transient(token: &AccessToken, reason: String) -> ProviderError {
    ProviderError::TransientNetworkError {
        attempts: 1,
        reason,
        token: token.masked(),
    }
}

/// Maps a non-success response onto the provider error taxonomy.
async fn classify_failure(
    token: &AccessToken,
    status: StatusCode,
    response: Response,
) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        return ProviderError::RateLimitExceeded {
            attempts: 1,
            retry_after,
            token: token.masked(),
        };
    }

    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        return transient(token, format!("provider responded with status {status}"));
    }

    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
        let (message, code) = match payload.errors {
            Some(detail) => (detail.message, detail.error_code),
            None => (payload.message, payload.code),
        };

        return ProviderError::ClientRequestError {
            status: status.as_u16(),
            code,
            message: message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("client error")
                    .to_string()
            }),
            token: token.masked(),
        };
    }

    ProviderError::InvalidResponse {
        context: "provider response".to_string(),
        reason: format!("unexpected status {status}"),
    }
}
