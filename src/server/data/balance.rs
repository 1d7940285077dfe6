use chrono::{NaiveDateTime, Utc};
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::server::{
    error::{store::StoreError, Error},
    model::provider::BalanceRecord,
};

/// Result of committing a balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotCommit {
    /// A new snapshot row was appended
    Inserted(entity::balance_snapshot::Model),
    /// An identical snapshot was already stored for this observation time
    Unchanged(entity::balance_snapshot::Model),
}

impl SnapshotCommit {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    pub fn model(&self) -> &entity::balance_snapshot::Model {
        match self {
            Self::Inserted(model) | Self::Unchanged(model) => model,
        }
    }
}

/// Latest snapshot of an account joined with the account and its entity.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub entity_slug: String,
    pub account: entity::bank_account::Model,
    pub snapshot: entity::balance_snapshot::Model,
}

pub struct BalanceSnapshotRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BalanceSnapshotRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Appends a balance snapshot for an account.
    ///
    /// Snapshots are append-only and ordered per account. Committing the same observation
    /// twice is a no-op, detected through the `(account_id, observed_at)` unique index so that
    /// concurrent writers cannot produce duplicates either.
    ///
    /// # Arguments
    /// - `account_id` - ID of the bank account row
    /// - `balance` - Balance reported by the provider
    /// - `observed_at` - Observation time, the start of the sync cycle
    ///
    /// # Returns
    /// - `Ok(SnapshotCommit::Inserted)` - Snapshot appended
    /// - `Ok(SnapshotCommit::Unchanged)` - Identical snapshot already stored
    /// - `Err(Error::StoreError(ConflictingSnapshot))` - A different balance is stored for this time
    /// - `Err(Error::StoreError(OutOfOrderSnapshot))` - A later observation is already stored
    /// - `Err(Error::DbErr)` - Database error
    pub async fn commit(
        &self,
        account_id: i32,
        balance: &BalanceRecord,
        observed_at: NaiveDateTime,
    ) -> Result<SnapshotCommit, Error> {
        if let Some(latest) = self.latest_for_account(account_id).await? {
            if latest.observed_at > observed_at {
                return Err(StoreError::OutOfOrderSnapshot {
                    account_id,
                    observed_at,
                    latest: latest.observed_at,
                }
                .into());
            }

            if latest.observed_at == observed_at {
                return Self::compare(latest, balance);
            }
        }

        let snapshot = entity::balance_snapshot::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            balance: ActiveValue::Set(balance.balance),
            available: ActiveValue::Set(balance.available),
            currency: ActiveValue::Set(balance.currency.clone()),
            observed_at: ActiveValue::Set(observed_at),
            ingested_at: ActiveValue::Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        let inserted = entity::prelude::BalanceSnapshot::insert_many([snapshot])
            .on_conflict(
                OnConflict::columns([
                    entity::balance_snapshot::Column::AccountId,
                    entity::balance_snapshot::Column::ObservedAt,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;

        let stored = self
            .find_by_observation(account_id, observed_at)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "balance snapshot for account {account_id} at {observed_at}"
                ))
            })?;

        if inserted == 0 {
            // Another writer won the race for this observation
            return Self::compare(stored, balance);
        }

        Ok(SnapshotCommit::Inserted(stored))
    }

    fn compare(
        stored: entity::balance_snapshot::Model,
        balance: &BalanceRecord,
    ) -> Result<SnapshotCommit, Error> {
        if stored.balance == balance.balance
            && stored.available == balance.available
            && stored.currency == balance.currency
        {
            Ok(SnapshotCommit::Unchanged(stored))
        } else {
            Err(StoreError::ConflictingSnapshot {
                account_id: stored.account_id,
                observed_at: stored.observed_at,
            }
            .into())
        }
    }

    pub async fn find_by_observation(
        &self,
        account_id: i32,
        observed_at: NaiveDateTime,
    ) -> Result<Option<entity::balance_snapshot::Model>, DbErr> {
        entity::prelude::BalanceSnapshot::find()
            .filter(entity::balance_snapshot::Column::AccountId.eq(account_id))
            .filter(entity::balance_snapshot::Column::ObservedAt.eq(observed_at))
            .one(self.db)
            .await
    }

    pub async fn latest_for_account(
        &self,
        account_id: i32,
    ) -> Result<Option<entity::balance_snapshot::Model>, DbErr> {
        entity::prelude::BalanceSnapshot::find()
            .filter(entity::balance_snapshot::Column::AccountId.eq(account_id))
            .order_by_desc(entity::balance_snapshot::Column::ObservedAt)
            .one(self.db)
            .await
    }

    /// All snapshots of an account in observation order.
    pub async fn history(
        &self,
        account_id: i32,
    ) -> Result<Vec<entity::balance_snapshot::Model>, DbErr> {
        entity::prelude::BalanceSnapshot::find()
            .filter(entity::balance_snapshot::Column::AccountId.eq(account_id))
            .order_by_asc(entity::balance_snapshot::Column::ObservedAt)
            .all(self.db)
            .await
    }

    /// Latest snapshot of every account of an entity, or of every entity when `None`.
    ///
    /// Accounts without any snapshot are omitted.
    pub async fn latest_balances(&self, entity_id: Option<i32>) -> Result<Vec<AccountBalance>, DbErr> {
        let mut query = entity::prelude::BankAccount::find()
            .find_also_related(entity::prelude::BusinessEntity);
        if let Some(entity_id) = entity_id {
            query = query.filter(entity::bank_account::Column::EntityId.eq(entity_id));
        }

        let accounts = query
            .order_by_asc(entity::bank_account::Column::EntityId)
            .order_by_asc(entity::bank_account::Column::Id)
            .all(self.db)
            .await?;

        let mut balances = Vec::with_capacity(accounts.len());
        for (account, business_entity) in accounts {
            let Some(business_entity) = business_entity else {
                continue;
            };

            if let Some(snapshot) = self.latest_for_account(account.id).await? {
                balances.push(AccountBalance {
                    entity_slug: business_entity.slug,
                    account,
                    snapshot,
                });
            }
        }

        Ok(balances)
    }
}
