use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000005_sync_run::SyncRun;

static IDX_SYNC_RUN_OUTCOME_SYNC_RUN_ID: &str = "idx_sync_run_outcome_sync_run_id";
static FK_SYNC_RUN_OUTCOME_SYNC_RUN_ID: &str = "fk_sync_run_outcome_sync_run_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRunOutcome::Table)
                    .if_not_exists()
                    .col(pk_auto(SyncRunOutcome::Id))
                    .col(integer(SyncRunOutcome::SyncRunId))
                    .col(string(SyncRunOutcome::EntitySlug))
                    .col(string(SyncRunOutcome::Outcome))
                    .col(text_null(SyncRunOutcome::Reason))
                    .col(integer(SyncRunOutcome::AccountsSynced))
                    .col(integer(SyncRunOutcome::AccountsFailed))
                    .col(integer(SyncRunOutcome::NewTransactions))
                    .col(integer(SyncRunOutcome::SnapshotsWritten))
                    .col(text_null(SyncRunOutcome::Detail))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_SYNC_RUN_OUTCOME_SYNC_RUN_ID)
                            .from(SyncRunOutcome::Table, SyncRunOutcome::SyncRunId)
                            .to(SyncRun::Table, SyncRun::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_SYNC_RUN_OUTCOME_SYNC_RUN_ID)
                    .table(SyncRunOutcome::Table)
                    .col(SyncRunOutcome::SyncRunId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_SYNC_RUN_OUTCOME_SYNC_RUN_ID)
                    .table(SyncRunOutcome::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SyncRunOutcome::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum SyncRunOutcome {
    Table,
    Id,
    SyncRunId,
    EntitySlug,
    Outcome,
    Reason,
    AccountsSynced,
    AccountsFailed,
    NewTransactions,
    SnapshotsWritten,
    Detail,
}
