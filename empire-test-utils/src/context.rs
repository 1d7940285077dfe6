//! Test context structure and utilities.
//!
//! The context returned by `TestBuilder` holds an in-memory SQLite database with every
//! migration applied and a mockito server standing in for the banking provider.

use std::collections::HashMap;

use mockito::{Mock, ServerGuard};
use sea_orm::DatabaseConnection;

use crate::fixtures::{provider::ProviderFixtures, store::StoreFixtures};

/// Test context structure returned by `TestBuilder`
///
/// # Usage
///
/// ```ignore
/// let mut test = TestBuilder::new()
///     .with_entity("empire-holdings")
///     .with_credential("empire-holdings", TEST_TOKEN)
///     .build()
///     .await?;
///
/// let account = test.store().insert_account(entity.id, "acc-1").await?;
/// let mock = test.provider().create_accounts_endpoint(TEST_TOKEN, vec![], 1);
///
/// test.assert_mocks();
/// ```
pub struct TestContext {
    /// Database connection to in-memory SQLite database
    pub db: DatabaseConnection,

    /// Mock HTTP server for provider endpoints
    pub(crate) server: ServerGuard,
    /// Collection of mock HTTP endpoints for assertion
    pub(crate) mocks: Vec<Mock>,
    /// Provider tokens by entity slug
    pub(crate) credentials: HashMap<String, String>,
}

impl TestContext {
    /// Base URL of the mock provider, to be used as the client base URL
    pub fn provider_url(&self) -> String {
        self.server.url()
    }

    /// Provider tokens registered with `with_credential`, keyed by entity slug
    pub fn credentials(&self) -> HashMap<String, String> {
        self.credentials.clone()
    }

    /// Access mock provider endpoint helpers
    pub fn provider(&mut self) -> ProviderFixtures<'_> {
        ProviderFixtures {
            server: &mut self.server,
        }
    }

    /// Access database fixture helpers
    pub fn store(&self) -> StoreFixtures<'_> {
        StoreFixtures { db: &self.db }
    }

    /// Keep a mock created after `build()` so it is checked by `assert_mocks`
    pub fn keep_mock(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }

    /// Assert all mock endpoints were called as expected.
    ///
    /// # Panics
    /// Panics if any mock endpoint was not called the expected number of times
    pub fn assert_mocks(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }
}
