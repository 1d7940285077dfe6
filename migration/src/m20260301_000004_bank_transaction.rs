use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000002_bank_account::BankAccount;

static UNQ_BANK_TRANSACTION_ACCOUNT_EXTERNAL: &str = "unq_bank_transaction_account_id_external_id";
static IDX_BANK_TRANSACTION_DATE: &str = "idx_bank_transaction_date";
static FK_BANK_TRANSACTION_ACCOUNT_ID: &str = "fk_bank_transaction_account_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BankTransaction::Table)
                    .if_not_exists()
                    .col(pk_auto(BankTransaction::Id))
                    .col(integer(BankTransaction::AccountId))
                    .col(string(BankTransaction::ExternalId))
                    .col(date(BankTransaction::Date))
                    .col(text(BankTransaction::Description))
                    .col(big_integer(BankTransaction::Amount))
                    .col(string(BankTransaction::Status))
                    .col(string_null(BankTransaction::Category))
                    .col(string_null(BankTransaction::Counterparty))
                    .col(text_null(BankTransaction::Note))
                    .col(timestamp_null(BankTransaction::PostedAt))
                    .col(timestamp(BankTransaction::CreatedAt))
                    .col(timestamp(BankTransaction::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_BANK_TRANSACTION_ACCOUNT_ID)
                            .from(BankTransaction::Table, BankTransaction::AccountId)
                            .to(BankAccount::Table, BankAccount::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNQ_BANK_TRANSACTION_ACCOUNT_EXTERNAL)
                    .table(BankTransaction::Table)
                    .col(BankTransaction::AccountId)
                    .col(BankTransaction::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_BANK_TRANSACTION_DATE)
                    .table(BankTransaction::Table)
                    .col(BankTransaction::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_BANK_TRANSACTION_DATE)
                    .table(BankTransaction::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(UNQ_BANK_TRANSACTION_ACCOUNT_EXTERNAL)
                    .table(BankTransaction::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(BankTransaction::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum BankTransaction {
    Table,
    Id,
    AccountId,
    ExternalId,
    Date,
    Description,
    Amount,
    Status,
    Category,
    Counterparty,
    Note,
    PostedAt,
    CreatedAt,
    UpdatedAt,
}
