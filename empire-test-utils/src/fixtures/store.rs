//! Reconciliation store rows inserted directly, bypassing the repositories.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::error::TestError;

pub struct StoreFixtures<'a> {
    pub db: &'a DatabaseConnection,
}

impl<'a> StoreFixtures<'a> {
    /// Insert an active operating business entity.
    ///
    /// Returns the existing row if the slug is already present. The credential reference is
    /// derived from the slug, e.g. `empire-labs` reads `MERCURY_TOKEN_EMPIRE_LABS`.
    pub async fn insert_entity(
        &self,
        slug: &str,
    ) -> Result<entity::business_entity::Model, TestError> {
        if let Some(existing) = entity::prelude::BusinessEntity::find()
            .filter(entity::business_entity::Column::Slug.eq(slug))
            .one(self.db)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now().naive_utc();

        Ok(
            entity::prelude::BusinessEntity::insert(entity::business_entity::ActiveModel {
                slug: ActiveValue::Set(slug.to_string()),
                name: ActiveValue::Set(slug.replace('-', " ")),
                legal_name: ActiveValue::Set(format!("{} LLC", slug)),
                classification: ActiveValue::Set("operating".to_string()),
                status: ActiveValue::Set("active".to_string()),
                credential_ref: ActiveValue::Set(format!(
                    "MERCURY_TOKEN_{}",
                    slug.replace('-', "_").to_uppercase()
                )),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            })
            .exec_with_returning(self.db)
            .await?,
        )
    }

    /// Insert an active checking account owned by `entity_id`.
    pub async fn insert_account(
        &self,
        entity_id: i32,
        external_id: &str,
    ) -> Result<entity::bank_account::Model, TestError> {
        let now = Utc::now().naive_utc();

        Ok(
            entity::prelude::BankAccount::insert(entity::bank_account::ActiveModel {
                entity_id: ActiveValue::Set(entity_id),
                external_id: ActiveValue::Set(external_id.to_string()),
                name: ActiveValue::Set(format!("Operating {}", external_id)),
                kind: ActiveValue::Set("checking".to_string()),
                masked_routing_number: ActiveValue::Set(Some("••••0021".to_string())),
                masked_account_number: ActiveValue::Set(Some("••••3210".to_string())),
                status: ActiveValue::Set("active".to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            })
            .exec_with_returning(self.db)
            .await?,
        )
    }

    /// Insert a transaction with the given date, amount in minor units and status.
    pub async fn insert_transaction(
        &self,
        account_id: i32,
        external_id: &str,
        date: NaiveDate,
        amount: i64,
        status: &str,
    ) -> Result<entity::bank_transaction::Model, TestError> {
        let now = Utc::now().naive_utc();

        Ok(
            entity::prelude::BankTransaction::insert(entity::bank_transaction::ActiveModel {
                account_id: ActiveValue::Set(account_id),
                external_id: ActiveValue::Set(external_id.to_string()),
                date: ActiveValue::Set(date),
                description: ActiveValue::Set(format!("Payment {}", external_id)),
                amount: ActiveValue::Set(amount),
                status: ActiveValue::Set(status.to_string()),
                category: ActiveValue::Set(None),
                counterparty: ActiveValue::Set(Some("Acme Supplies".to_string())),
                note: ActiveValue::Set(None),
                posted_at: ActiveValue::Set(None),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            })
            .exec_with_returning(self.db)
            .await?,
        )
    }

    /// Insert a USD balance snapshot observed at `observed_at`.
    pub async fn insert_snapshot(
        &self,
        account_id: i32,
        balance: i64,
        observed_at: NaiveDateTime,
    ) -> Result<entity::balance_snapshot::Model, TestError> {
        Ok(
            entity::prelude::BalanceSnapshot::insert(entity::balance_snapshot::ActiveModel {
                account_id: ActiveValue::Set(account_id),
                balance: ActiveValue::Set(balance),
                available: ActiveValue::Set(Some(balance)),
                currency: ActiveValue::Set("USD".to_string()),
                observed_at: ActiveValue::Set(observed_at),
                ingested_at: ActiveValue::Set(Utc::now().naive_utc()),
                ..Default::default()
            })
            .exec_with_returning(self.db)
            .await?,
        )
    }
}
