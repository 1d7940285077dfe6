
use std::time::Duration;

use chrono::NaiveDateTime;
use empire_test_utils::prelude::*;
use serde_json::json;

use crate::server::{
    client::{ClientConfig, MercuryClient, RetryPolicy},
    credential::CredentialRegistry,
    service::{
        cache::BalanceCache,
        sync::{SyncContext, SyncCoordinator, SyncSettings},
    },
};

/// Sync context pointed at the mock provider, retrying nothing so failures surface at once.
fn sync_context(test: &TestContext, settings: SyncSettings) -> SyncContext {
    let mut config = ClientConfig::new(test.provider_url());
    config.retry = RetryPolicy::immediate(1);

    SyncContext {
        db: test.db.clone(),
        client: MercuryClient::new(config).unwrap(),
        credentials: CredentialRegistry::new(test.credentials()),
        settings,
    }
}

fn coordinator(test: &TestContext) -> SyncCoordinator {
    let cache = BalanceCache::new(
        test.db.clone(),
        Duration::from_secs(300),
        Duration::from_secs(86400),
    );

    SyncCoordinator::new(sync_context(test, SyncSettings::default()), cache)
}

fn observed_at() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-02-03 10:05:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

fn server_error() -> serde_json::Value {
    json!({ "errors": { "message": "upstream unavailable" } })
}
