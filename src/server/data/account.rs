use chrono::Utc;
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::model::provider::AccountRecord;

pub struct BankAccountRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BankAccountRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Inserts or refreshes an account discovered during sync, keyed by provider account id.
    ///
    /// # Arguments
    /// - `entity_id` - ID of the owning business entity row
    /// - `account` - Account as reported by the provider, numbers already masked
    ///
    /// # Notes
    /// - Accounts are never deleted, closed accounts keep their row with status `closed`
    pub async fn upsert(
        &self,
        entity_id: i32,
        account: &AccountRecord,
    ) -> Result<entity::bank_account::Model, DbErr> {
        let now = Utc::now().naive_utc();
        let model = entity::bank_account::ActiveModel {
            entity_id: ActiveValue::Set(entity_id),
            external_id: ActiveValue::Set(account.external_id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            masked_routing_number: ActiveValue::Set(account.masked_routing_number.clone()),
            masked_account_number: ActiveValue::Set(account.masked_account_number.clone()),
            status: ActiveValue::Set(account.status.as_str().to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        entity::prelude::BankAccount::insert_many([model])
            .on_conflict(
                OnConflict::column(entity::bank_account::Column::ExternalId)
                    .update_columns([
                        entity::bank_account::Column::Name,
                        entity::bank_account::Column::Kind,
                        entity::bank_account::Column::MaskedRoutingNumber,
                        entity::bank_account::Column::MaskedAccountNumber,
                        entity::bank_account::Column::Status,
                        entity::bank_account::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("bank account {} after upsert", account.external_id))
            })
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<entity::bank_account::Model>, DbErr> {
        entity::prelude::BankAccount::find_by_id(id).one(self.db).await
    }

    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<entity::bank_account::Model>, DbErr> {
        entity::prelude::BankAccount::find()
            .filter(entity::bank_account::Column::ExternalId.eq(external_id))
            .one(self.db)
            .await
    }

    /// Accounts of one entity, or of every entity when `entity_id` is `None`.
    pub async fn get_by_entity(
        &self,
        entity_id: Option<i32>,
    ) -> Result<Vec<entity::bank_account::Model>, DbErr> {
        let mut query = entity::prelude::BankAccount::find();
        if let Some(entity_id) = entity_id {
            query = query.filter(entity::bank_account::Column::EntityId.eq(entity_id));
        }

        query
            .order_by_asc(entity::bank_account::Column::EntityId)
            .order_by_asc(entity::bank_account::Column::Id)
            .all(self.db)
            .await
    }
}
