use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessEntity::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessEntity::Id))
                    .col(string_uniq(BusinessEntity::Slug))
                    .col(string(BusinessEntity::Name))
                    .col(string(BusinessEntity::LegalName))
                    .col(string(BusinessEntity::Classification))
                    .col(string(BusinessEntity::Status))
                    .col(string(BusinessEntity::CredentialRef))
                    .col(timestamp(BusinessEntity::CreatedAt))
                    .col(timestamp(BusinessEntity::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BusinessEntity::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BusinessEntity {
    Table,
    Id,
    Slug,
    Name,
    LegalName,
    Classification,
    Status,
    CredentialRef,
    CreatedAt,
    UpdatedAt,
}
