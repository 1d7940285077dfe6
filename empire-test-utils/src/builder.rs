//! Declarative test builder.
//!
//! Configuration methods are queued and executed during the final `build()` call: the
//! database is created and migrated first, then entity rows are inserted, then mock provider
//! endpoints are registered.

use std::collections::HashMap;

use migration::{Migrator, MigratorTrait};
use mockito::{Mock, Server, ServerGuard};
use sea_orm::Database;
use serde_json::Value;

use crate::{
    error::TestError,
    fixtures::{provider::ProviderFixtures, store::StoreFixtures},
    TestContext,
};

/// Builder for declarative test initialization.
pub struct TestBuilder {
    // Database fixtures to insert
    entities: Vec<String>,
    credentials: Vec<(String, String)>,

    // Mock endpoints to create
    mock_builders: Vec<Box<dyn FnOnce(&mut ServerGuard) -> Mock>>,

    // Pre-configured endpoint shortcuts
    accounts_endpoints: Vec<(String, Vec<Value>, usize)>, // (token, accounts, expected_requests)
    account_endpoints: Vec<(String, Value, usize)>,
    transactions_endpoints: Vec<(String, String, Option<String>, Vec<Value>, usize)>, // (token, account_id, start, transactions, expected_requests)
}

impl TestBuilder {
    /// Create a new TestBuilder with no entities or endpoints.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            credentials: Vec::new(),
            mock_builders: Vec::new(),
            accounts_endpoints: Vec::new(),
            account_endpoints: Vec::new(),
            transactions_endpoints: Vec::new(),
        }
    }

    /// Insert a business entity row.
    ///
    /// # Arguments
    /// - `slug` - Entity slug, also the credential registry key
    ///
    /// # Returns
    /// - `Self` - The builder instance for method chaining
    pub fn with_entity(mut self, slug: &str) -> Self {
        self.entities.push(slug.to_string());
        self
    }

    /// Register a provider token for an entity.
    ///
    /// The token is exposed through `TestContext::credentials` for building a credential
    /// registry. No entity row is inserted, combine with `with_entity` for that.
    pub fn with_credential(mut self, slug: &str, token: &str) -> Self {
        self.credentials.push((slug.to_string(), token.to_string()));
        self
    }

    /// Add a custom mock endpoint.
    ///
    /// Custom endpoints are created before the shortcut endpoints so tests can register
    /// several mocks for the same path in a known order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let test = TestBuilder::new()
    ///     .with_mock_endpoint(|server| {
    ///         server.mock("GET", "/accounts").with_status(500).expect(3).create()
    ///     })
    ///     .build()
    ///     .await?;
    /// ```
    pub fn with_mock_endpoint<F>(mut self, builder: F) -> Self
    where
        F: FnOnce(&mut ServerGuard) -> Mock + 'static,
    {
        self.mock_builders.push(Box::new(builder));
        self
    }

    /// Create a `GET /accounts` endpoint for a token.
    pub fn with_accounts_endpoint(
        mut self,
        token: &str,
        accounts: Vec<Value>,
        expected_requests: usize,
    ) -> Self {
        self.accounts_endpoints
            .push((token.to_string(), accounts, expected_requests));
        self
    }

    /// Create a `GET /account/{id}` endpoint returning the account and its balance.
    pub fn with_account_endpoint(
        mut self,
        token: &str,
        account: Value,
        expected_requests: usize,
    ) -> Self {
        self.account_endpoints
            .push((token.to_string(), account, expected_requests));
        self
    }

    /// Create a `GET /account/{id}/transactions` endpoint.
    ///
    /// # Arguments
    /// - `start` - Expected `start` query value, `None` accepts any query
    pub fn with_transactions_endpoint(
        mut self,
        token: &str,
        account_id: &str,
        start: Option<&str>,
        transactions: Vec<Value>,
        expected_requests: usize,
    ) -> Self {
        self.transactions_endpoints.push((
            token.to_string(),
            account_id.to_string(),
            start.map(str::to_string),
            transactions,
            expected_requests,
        ));
        self
    }

    /// Build the test context.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Migrated database, fixtures inserted, mocks registered
    /// - `Err(TestError::DbErr)` - Connecting, migrating or inserting fixtures failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let server = Server::new_async().await;
        let db = Database::connect("sqlite::memory:").await?;

        // 1. Create every table with its uniqueness constraints
        Migrator::up(&db, None).await?;

        // 2. Insert database fixtures
        {
            let store = StoreFixtures { db: &db };
            for slug in &self.entities {
                store.insert_entity(slug).await?;
            }
        }

        let mut test = TestContext {
            db,
            server,
            mocks: Vec::new(),
            credentials: self.credentials.into_iter().collect::<HashMap<_, _>>(),
        };

        // 3. Create mock endpoints
        let mut mocks = Vec::new();

        for builder in self.mock_builders {
            mocks.push(builder(&mut test.server));
        }

        let mut provider = ProviderFixtures {
            server: &mut test.server,
        };

        for (token, accounts, expected) in self.accounts_endpoints {
            mocks.push(provider.create_accounts_endpoint(&token, accounts, expected));
        }

        for (token, account, expected) in self.account_endpoints {
            mocks.push(provider.create_account_endpoint(&token, account, expected));
        }

        for (token, account_id, start, transactions, expected) in self.transactions_endpoints {
            mocks.push(provider.create_transactions_endpoint(
                &token,
                &account_id,
                start.as_deref(),
                transactions,
                expected,
            ));
        }

        // Store mocks in the context so they live as long as the test
        test.mocks = mocks;

        Ok(test)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
