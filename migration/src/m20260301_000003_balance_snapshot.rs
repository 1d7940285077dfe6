use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000002_bank_account::BankAccount;

/// One snapshot per account per observation timestamp; re-running a sync inside the
/// same cycle collides here instead of appending a duplicate.
static UNQ_BALANCE_SNAPSHOT_ACCOUNT_OBSERVED: &str = "unq_balance_snapshot_account_id_observed_at";
static FK_BALANCE_SNAPSHOT_ACCOUNT_ID: &str = "fk_balance_snapshot_account_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BalanceSnapshot::Table)
                    .if_not_exists()
                    .col(pk_auto(BalanceSnapshot::Id))
                    .col(integer(BalanceSnapshot::AccountId))
                    .col(big_integer(BalanceSnapshot::Balance))
                    .col(big_integer_null(BalanceSnapshot::Available))
                    .col(string(BalanceSnapshot::Currency))
                    .col(timestamp(BalanceSnapshot::ObservedAt))
                    .col(timestamp(BalanceSnapshot::IngestedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_BALANCE_SNAPSHOT_ACCOUNT_ID)
                            .from(BalanceSnapshot::Table, BalanceSnapshot::AccountId)
                            .to(BankAccount::Table, BankAccount::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNQ_BALANCE_SNAPSHOT_ACCOUNT_OBSERVED)
                    .table(BalanceSnapshot::Table)
                    .col(BalanceSnapshot::AccountId)
                    .col(BalanceSnapshot::ObservedAt)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(UNQ_BALANCE_SNAPSHOT_ACCOUNT_OBSERVED)
                    .table(BalanceSnapshot::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(BalanceSnapshot::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum BalanceSnapshot {
    Table,
    Id,
    AccountId,
    Balance,
    Available,
    Currency,
    ObservedAt,
    IngestedAt,
}
