use sea_orm_migration::{prelude::*, schema::*};

use crate::m20260301_000001_business_entity::BusinessEntity;

static IDX_BANK_ACCOUNT_ENTITY_ID: &str = "idx_bank_account_entity_id";
static FK_BANK_ACCOUNT_ENTITY_ID: &str = "fk_bank_account_entity_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BankAccount::Table)
                    .if_not_exists()
                    .col(pk_auto(BankAccount::Id))
                    .col(integer(BankAccount::EntityId))
                    .col(string_uniq(BankAccount::ExternalId))
                    .col(string(BankAccount::Name))
                    .col(string(BankAccount::Kind))
                    .col(string_null(BankAccount::MaskedRoutingNumber))
                    .col(string_null(BankAccount::MaskedAccountNumber))
                    .col(string(BankAccount::Status))
                    .col(timestamp(BankAccount::CreatedAt))
                    .col(timestamp(BankAccount::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_BANK_ACCOUNT_ENTITY_ID)
                            .from(BankAccount::Table, BankAccount::EntityId)
                            .to(BusinessEntity::Table, BusinessEntity::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_BANK_ACCOUNT_ENTITY_ID)
                    .table(BankAccount::Table)
                    .col(BankAccount::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_BANK_ACCOUNT_ENTITY_ID)
                    .table(BankAccount::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(BankAccount::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum BankAccount {
    Table,
    Id,
    EntityId,
    ExternalId,
    Name,
    Kind,
    MaskedRoutingNumber,
    MaskedAccountNumber,
    Status,
    CreatedAt,
    UpdatedAt,
}
