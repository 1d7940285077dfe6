use sea_orm::DatabaseConnection;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::server::{
    client::MercuryClient,
    config::Config,
    credential::CredentialRegistry,
    data::{entity::BusinessEntityRepository, sync_run::SyncRunRepository},
    error::Error,
    model::{app::AppState, entity::EntityProfile},
    service::{
        cache::BalanceCache,
        sync::{SyncContext, SyncCoordinator},
    },
};

/// Connect to the database and run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, Error> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Upsert the configured business entities and close runs left open by a previous process
pub async fn prepare_store(db: &DatabaseConnection, profiles: &[EntityProfile]) -> Result<(), Error> {
    let entities = BusinessEntityRepository::new(db).upsert_many(profiles).await?;
    tracing::info!("Seeded {} business entities", entities.len());

    let interrupted = SyncRunRepository::new(db)
        .fail_interrupted(chrono::Utc::now().naive_utc())
        .await?;
    if interrupted > 0 {
        tracing::warn!("Marked {} interrupted sync runs as failed", interrupted);
    }

    Ok(())
}

/// Build the banking provider client
pub fn build_mercury_client(config: &Config) -> Result<MercuryClient, Error> {
    MercuryClient::new(config.client_config())
}

/// Wire the cache and coordinator into the shared handler state
pub fn build_app_state(
    config: &Config,
    db: DatabaseConnection,
    client: MercuryClient,
    credentials: CredentialRegistry,
) -> AppState {
    let cache = BalanceCache::new(db.clone(), config.cache_ttl, config.cache_max_staleness);
    let ctx = SyncContext {
        db: db.clone(),
        client,
        credentials,
        settings: config.sync_settings(),
    };
    let coordinator = SyncCoordinator::new(ctx, cache.clone());

    AppState {
        db,
        coordinator,
        cache,
    }
}

/// Log sync failure alerts raised by the coordinator
pub fn spawn_alert_logger(coordinator: &SyncCoordinator) -> JoinHandle<()> {
    let mut alerts = coordinator.subscribe_alerts();

    tokio::spawn(async move {
        loop {
            match alerts.recv().await {
                Ok(alert) => tracing::error!(
                    run_id = alert.run_id,
                    failed = ?alert.failed_entities,
                    total = alert.total_entities,
                    "Sync alert: {:.0}% of entities failed",
                    alert.failure_ratio * 100.0
                ),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Alert logger fell behind, {} alerts missed", missed)
                }
                Err(RecvError::Closed) => return,
            }
        }
    })
}
