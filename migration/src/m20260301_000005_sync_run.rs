use sea_orm_migration::{prelude::*, schema::*};

static IDX_SYNC_RUN_STARTED_AT: &str = "idx_sync_run_started_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRun::Table)
                    .if_not_exists()
                    .col(pk_auto(SyncRun::Id))
                    .col(string(SyncRun::Trigger))
                    .col(string(SyncRun::Status))
                    .col(timestamp(SyncRun::StartedAt))
                    .col(timestamp_null(SyncRun::FinishedAt))
                    .col(integer(SyncRun::EntitiesSynced))
                    .col(integer(SyncRun::EntitiesFailed))
                    .col(integer(SyncRun::AccountsTouched))
                    .col(integer(SyncRun::NewTransactions))
                    .col(integer(SyncRun::SnapshotsWritten))
                    .col(text_null(SyncRun::FailureReason))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SYNC_RUN_STARTED_AT)
                    .table(SyncRun::Table)
                    .col(SyncRun::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_SYNC_RUN_STARTED_AT)
                    .table(SyncRun::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SyncRun::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum SyncRun {
    Table,
    Id,
    Trigger,
    Status,
    StartedAt,
    FinishedAt,
    EntitiesSynced,
    EntitiesFailed,
    AccountsTouched,
    NewTransactions,
    SnapshotsWritten,
    FailureReason,
}
