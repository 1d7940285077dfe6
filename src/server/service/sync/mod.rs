//! Entity sync workers and the run coordinator.

pub mod coordinator;
pub mod worker;

#[cfg(test)]
mod tests;

pub use coordinator::{RunHandle, SyncCoordinator, TriggerOutcome};
pub use worker::EntitySyncWorker;

use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::server::{client::MercuryClient, credential::CredentialRegistry};

/// Tunables of a sync run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Entities synced at the same time
    pub entity_concurrency: usize,
    /// Accounts synced at the same time within one entity
    pub account_concurrency: usize,
    /// Wall-clock budget of one entity sync
    pub entity_timeout: Duration,
    /// Granularity of balance snapshot observation times
    pub cycle: Duration,
    /// Fraction of failed entities above which an alert is raised
    pub alert_failure_ratio: f64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            entity_concurrency: 3,
            account_concurrency: 4,
            entity_timeout: Duration::from_secs(90),
            cycle: Duration::from_secs(300),
            alert_failure_ratio: 0.5,
        }
    }
}

/// Dependencies shared by every sync task.
#[derive(Clone)]
pub struct SyncContext {
    pub db: DatabaseConnection,
    pub client: MercuryClient,
    pub credentials: CredentialRegistry,
    pub settings: SyncSettings,
}
