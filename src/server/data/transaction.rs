use chrono::{NaiveDate, Utc};
use migration::{OnConflict, Query};
use sea_orm::{
    sea_query::Condition, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::{
    data::{Page, Pagination},
    error::store::StoreError,
    model::provider::{TransactionRecord, TransactionStatus},
};

/// Counts and rejections from committing a batch of transactions for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionCommit {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Records that were not applied, the rest of the batch still was
    pub rejected: Vec<StoreError>,
}

/// Filter for transaction reads. Every field is optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub entity_id: Option<i32>,
    pub account_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    /// Case-sensitive substring of the description, counterparty or note
    pub search: Option<String>,
}

pub struct BankTransactionRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BankTransactionRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Upserts a batch of transactions for one account by provider transaction ID.
    ///
    /// Records are applied in the order given, so several updates of the same transaction in
    /// one batch end with the last valid one. A record that would move a stored transaction
    /// backwards (e.g. posted to pending) is rejected and logged, and the stored row keeps
    /// its status.
    ///
    /// # Arguments
    /// - `account_id` - ID of the bank account row
    /// - `records` - Normalized provider transactions
    ///
    /// # Returns
    /// - `Ok(TransactionCommit)` - Per batch counts and the rejected records
    /// - `Err(DbErr)` - Database error, records before the failing one remain applied
    pub async fn commit_many(
        &self,
        account_id: i32,
        records: &[TransactionRecord],
    ) -> Result<TransactionCommit, DbErr> {
        let mut commit = TransactionCommit::default();

        for record in records {
            let existing = match self.find_by_external_id(account_id, &record.external_id).await? {
                Some(existing) => existing,
                None => {
                    if self.insert_new(account_id, record).await? > 0 {
                        commit.inserted += 1;
                        continue;
                    }

                    // A concurrent writer inserted it first, reconcile against its row
                    self.find_by_external_id(account_id, &record.external_id)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!("transaction {}", record.external_id))
                        })?
                }
            };

            match self.apply_update(existing, record).await? {
                Ok(true) => commit.updated += 1,
                Ok(false) => commit.unchanged += 1,
                Err(rejection) => {
                    tracing::warn!(account_id, "{}", rejection);
                    commit.rejected.push(rejection);
                }
            }
        }

        Ok(commit)
    }

    async fn insert_new(&self, account_id: i32, record: &TransactionRecord) -> Result<u64, DbErr> {
        let now = Utc::now().naive_utc();
        let transaction = entity::bank_transaction::ActiveModel {
            account_id: ActiveValue::Set(account_id),
            external_id: ActiveValue::Set(record.external_id.clone()),
            date: ActiveValue::Set(record.date),
            description: ActiveValue::Set(record.description.clone()),
            amount: ActiveValue::Set(record.amount),
            status: ActiveValue::Set(record.status.as_str().to_string()),
            category: ActiveValue::Set(record.category.clone()),
            counterparty: ActiveValue::Set(record.counterparty.clone()),
            note: ActiveValue::Set(record.note.clone()),
            posted_at: ActiveValue::Set(record.posted_at),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        entity::prelude::BankTransaction::insert_many([transaction])
            .on_conflict(
                OnConflict::columns([
                    entity::bank_transaction::Column::AccountId,
                    entity::bank_transaction::Column::ExternalId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db)
            .await
    }

    /// Applies `record` over the stored row.
    ///
    /// Returns `Ok(Ok(true))` when the row changed, `Ok(Ok(false))` when it already matched,
    /// and `Ok(Err(_))` when the status change is not allowed.
    async fn apply_update(
        &self,
        existing: entity::bank_transaction::Model,
        record: &TransactionRecord,
    ) -> Result<Result<bool, StoreError>, DbErr> {
        let current = TransactionStatus::parse(&existing.status).ok_or_else(|| {
            DbErr::Custom(format!(
                "transaction {} has unknown stored status {:?}",
                existing.external_id, existing.status
            ))
        })?;

        if !current.can_transition_to(record.status) {
            return Ok(Err(StoreError::InvalidStateTransition {
                external_id: existing.external_id,
                from: current.as_str().to_string(),
                to: record.status.as_str().to_string(),
            }));
        }

        let unchanged = existing.date == record.date
            && existing.description == record.description
            && existing.amount == record.amount
            && existing.status == record.status.as_str()
            && existing.category == record.category
            && existing.counterparty == record.counterparty
            && existing.note == record.note
            && existing.posted_at == record.posted_at;
        if unchanged {
            return Ok(Ok(false));
        }

        let mut transaction = existing.into_active_model();
        transaction.date = ActiveValue::Set(record.date);
        transaction.description = ActiveValue::Set(record.description.clone());
        transaction.amount = ActiveValue::Set(record.amount);
        transaction.status = ActiveValue::Set(record.status.as_str().to_string());
        transaction.category = ActiveValue::Set(record.category.clone());
        transaction.counterparty = ActiveValue::Set(record.counterparty.clone());
        transaction.note = ActiveValue::Set(record.note.clone());
        transaction.posted_at = ActiveValue::Set(record.posted_at);
        transaction.updated_at = ActiveValue::Set(Utc::now().naive_utc());
        transaction.update(self.db).await?;

        Ok(Ok(true))
    }

    pub async fn find_by_external_id(
        &self,
        account_id: i32,
        external_id: &str,
    ) -> Result<Option<entity::bank_transaction::Model>, DbErr> {
        entity::prelude::BankTransaction::find()
            .filter(entity::bank_transaction::Column::AccountId.eq(account_id))
            .filter(entity::bank_transaction::Column::ExternalId.eq(external_id))
            .one(self.db)
            .await
    }

    /// Date of the most recent stored transaction of an account, the incremental fetch cursor.
    pub async fn last_cursor(&self, account_id: i32) -> Result<Option<NaiveDate>, DbErr> {
        let latest = entity::prelude::BankTransaction::find()
            .filter(entity::bank_transaction::Column::AccountId.eq(account_id))
            .order_by_desc(entity::bank_transaction::Column::Date)
            .one(self.db)
            .await?;

        Ok(latest.map(|transaction| transaction.date))
    }

    /// Filtered, paginated transaction read, newest first.
    pub async fn search(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Page<entity::bank_transaction::Model>, DbErr> {
        let mut condition = Condition::all();

        if let Some(entity_id) = filter.entity_id {
            condition = condition.add(
                entity::bank_transaction::Column::AccountId.in_subquery(
                    Query::select()
                        .column(entity::bank_account::Column::Id)
                        .from(entity::bank_account::Entity)
                        .and_where(entity::bank_account::Column::EntityId.eq(entity_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(account_id) = filter.account_id {
            condition = condition.add(entity::bank_transaction::Column::AccountId.eq(account_id));
        }
        if let Some(start_date) = filter.start_date {
            condition = condition.add(entity::bank_transaction::Column::Date.gte(start_date));
        }
        if let Some(end_date) = filter.end_date {
            condition = condition.add(entity::bank_transaction::Column::Date.lte(end_date));
        }
        if let Some(min_amount) = filter.min_amount {
            condition = condition.add(entity::bank_transaction::Column::Amount.gte(min_amount));
        }
        if let Some(max_amount) = filter.max_amount {
            condition = condition.add(entity::bank_transaction::Column::Amount.lte(max_amount));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(entity::bank_transaction::Column::Description.contains(search))
                    .add(entity::bank_transaction::Column::Counterparty.contains(search))
                    .add(entity::bank_transaction::Column::Note.contains(search)),
            );
        }

        let query = entity::prelude::BankTransaction::find().filter(condition);
        let total = query.clone().count(self.db).await?;
        let items = query
            .order_by_desc(entity::bank_transaction::Column::Date)
            .order_by_desc(entity::bank_transaction::Column::Id)
            .limit(pagination.limit)
            .offset(pagination.offset)
            .all(self.db)
            .await?;

        Ok(Page {
            items,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        })
    }
}
