//! Mock provider HTTP endpoints.
//!
//! Every endpoint only matches requests carrying the given bearer token, so a request made
//! with the wrong entity's credential falls through to a 501 from mockito.

use ::mockito::{Matcher, Mock};
use serde_json::Value;

use crate::fixtures::provider::{
    factory::{accounts_body, transactions_body},
    ProviderFixtures,
};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

impl<'a> ProviderFixtures<'a> {
    /// Create a mock endpoint for `GET /accounts`.
    ///
    /// # Arguments
    /// - `token` - Bearer token the request must carry
    /// - `accounts` - Account payloads to return
    /// - `expected_requests` - Number of times this endpoint should be called
    pub fn create_accounts_endpoint(
        &mut self,
        token: &str,
        accounts: Vec<Value>,
        expected_requests: usize,
    ) -> Mock {
        self.server
            .mock("GET", "/accounts")
            .match_header("authorization", bearer(token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(accounts_body(accounts).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock endpoint for `GET /account/{id}` returning the account with its balance.
    pub fn create_account_endpoint(
        &mut self,
        token: &str,
        account: Value,
        expected_requests: usize,
    ) -> Mock {
        let account_id = account["id"].as_str().unwrap_or_default().to_string();
        let url = format!("/account/{}", account_id);

        self.server
            .mock("GET", url.as_str())
            .match_header("authorization", bearer(token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(account.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock endpoint for `GET /account/{id}/transactions`.
    ///
    /// # Arguments
    /// - `token` - Bearer token the request must carry
    /// - `account_id` - Provider account ID
    /// - `start` - Expected `start` query value, or `None` to accept any query
    /// - `transactions` - Transaction payloads to return
    /// - `expected_requests` - Number of times this endpoint should be called
    pub fn create_transactions_endpoint(
        &mut self,
        token: &str,
        account_id: &str,
        start: Option<&str>,
        transactions: Vec<Value>,
        expected_requests: usize,
    ) -> Mock {
        let url = format!("/account/{}/transactions", account_id);
        let query = match start {
            Some(start) => Matcher::UrlEncoded("start".to_string(), start.to_string()),
            None => Matcher::Any,
        };

        self.server
            .mock("GET", url.as_str())
            .match_header("authorization", bearer(token).as_str())
            .match_query(query)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(transactions_body(transactions).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock endpoint answering `GET {path}` with an error status and JSON body.
    pub fn create_error_endpoint(
        &mut self,
        path: &str,
        status: usize,
        body: Value,
        expected_requests: usize,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock endpoint answering `GET {path}` with 429 and a `Retry-After` header.
    pub fn create_rate_limited_endpoint(
        &mut self,
        path: &str,
        retry_after_secs: u64,
        expected_requests: usize,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(429)
            .with_header("retry-after", retry_after_secs.to_string().as_str())
            .with_body("")
            .expect(expected_requests)
            .create()
    }

    /// Create a mock endpoint answering `GET {path}` with a plain JSON body, any token.
    pub fn create_json_endpoint(
        &mut self,
        path: &str,
        body: Value,
        expected_requests: usize,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(expected_requests)
            .create()
    }
}
