pub use sea_orm_migration::prelude::*;

mod m20260301_000001_business_entity;
mod m20260301_000002_bank_account;
mod m20260301_000003_balance_snapshot;
mod m20260301_000004_bank_transaction;
mod m20260301_000005_sync_run;
mod m20260301_000006_sync_run_outcome;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_business_entity::Migration),
            Box::new(m20260301_000002_bank_account::Migration),
            Box::new(m20260301_000003_balance_snapshot::Migration),
            Box::new(m20260301_000004_bank_transaction::Migration),
            Box::new(m20260301_000005_sync_run::Migration),
            Box::new(m20260301_000006_sync_run_outcome::Migration),
        ]
    }
}
