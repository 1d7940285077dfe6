use sea_orm::DatabaseConnection;

use crate::server::service::{cache::BalanceCache, sync::SyncCoordinator};

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub coordinator: SyncCoordinator,
    pub cache: BalanceCache,
}
