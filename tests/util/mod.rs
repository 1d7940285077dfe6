//! Builders turning a [`TestContext`] into the server types under test.
//!
//! Lives here rather than in `empire-test-utils` so the utils crate does not depend on the
//! server crate.

use std::time::Duration;

use empire::server::{
    client::{ClientConfig, MercuryClient, RetryPolicy},
    credential::CredentialRegistry,
    model::app::AppState,
    service::{
        cache::BalanceCache,
        sync::{SyncContext, SyncCoordinator, SyncSettings},
    },
};
use empire_test_utils::TestContext;

/// Extension trait for TestContext to create clients, sync contexts and AppState
pub trait TestContextExt {
    /// Client pointed at the mock provider with the given retry policy
    fn mercury_client(&self, retry: RetryPolicy) -> MercuryClient;

    /// Sync context with the registered credentials and no retry delays
    fn sync_context(&self, settings: SyncSettings) -> SyncContext;

    /// Coordinator over [`TestContextExt::sync_context`] with default settings
    fn coordinator(&self) -> SyncCoordinator;

    fn into_app_state(&self) -> AppState;
}

impl TestContextExt for TestContext {
    fn mercury_client(&self, retry: RetryPolicy) -> MercuryClient {
        let mut config = ClientConfig::new(self.provider_url());
        config.retry = retry;

        MercuryClient::new(config).expect("Failed to build provider client")
    }

    fn sync_context(&self, settings: SyncSettings) -> SyncContext {
        SyncContext {
            db: self.db.clone(),
            client: self.mercury_client(RetryPolicy::immediate(1)),
            credentials: CredentialRegistry::new(self.credentials()),
            settings,
        }
    }

    fn coordinator(&self) -> SyncCoordinator {
        SyncCoordinator::new(self.sync_context(SyncSettings::default()), balance_cache(self))
    }

    fn into_app_state(&self) -> AppState {
        let cache = balance_cache(self);

        AppState {
            db: self.db.clone(),
            coordinator: SyncCoordinator::new(
                self.sync_context(SyncSettings::default()),
                cache.clone(),
            ),
            cache,
        }
    }
}

fn balance_cache(test: &TestContext) -> BalanceCache {
    BalanceCache::new(
        test.db.clone(),
        Duration::from_secs(300),
        Duration::from_secs(86400),
    )
}
