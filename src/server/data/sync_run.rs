use std::collections::HashMap;

use chrono::NaiveDateTime;
use migration::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionSession, TransactionTrait,
};

use crate::server::{
    error::{store::StoreError, Error},
    model::outcome::{EntityReport, RunStatus, TriggerSource},
};

/// A sync run together with its per-entity outcomes.
pub type SyncRunWithOutcomes = (
    entity::sync_run::Model,
    Vec<entity::sync_run_outcome::Model>,
);

pub struct SyncRunRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SyncRunRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Opens an audit record for a run in `running` status.
    pub async fn start(
        &self,
        trigger: TriggerSource,
        started_at: NaiveDateTime,
    ) -> Result<entity::sync_run::Model, DbErr> {
        let run = entity::sync_run::ActiveModel {
            trigger: ActiveValue::Set(trigger.as_str().to_string()),
            status: ActiveValue::Set(RunStatus::Running.as_str().to_string()),
            started_at: ActiveValue::Set(started_at),
            finished_at: ActiveValue::Set(None),
            entities_synced: ActiveValue::Set(0),
            entities_failed: ActiveValue::Set(0),
            accounts_touched: ActiveValue::Set(0),
            new_transactions: ActiveValue::Set(0),
            snapshots_written: ActiveValue::Set(0),
            failure_reason: ActiveValue::Set(None),
            ..Default::default()
        };

        run.insert(self.db).await
    }

    /// Finalizes a running audit record and stores its per-entity outcomes.
    ///
    /// Only a record still in `running` status can be finalized, finalized records are
    /// never changed again. The status update and the outcome rows are written in one
    /// transaction, so a failed outcome insert leaves the record `running`.
    ///
    /// # Arguments
    /// - `run_id` - ID of the sync run row
    /// - `status` - Final status, `completed` or `failed`
    /// - `finished_at` - Completion time
    /// - `reports` - Per-entity outcomes of the run
    /// - `failure_reason` - Run level failure, if the run could not complete
    ///
    /// # Returns
    /// - `Ok(Model)` - The finalized record
    /// - `Err(Error::StoreError(AuditRecordFinalized))` - The record was already finalized
    /// - `Err(Error::DbErr)` - Database error or unknown run
    pub async fn finalize(
        &self,
        run_id: i32,
        status: RunStatus,
        finished_at: NaiveDateTime,
        reports: &[EntityReport],
        failure_reason: Option<String>,
    ) -> Result<entity::sync_run::Model, Error>
    where
        C: TransactionTrait,
    {
        let synced = reports.iter().filter(|r| r.outcome.is_synced()).count();
        let failed = reports.len() - synced;
        let accounts_touched: usize = reports.iter().map(|r| r.stats.accounts_touched()).sum();
        let new_transactions: usize = reports.iter().map(|r| r.stats.new_transactions).sum();
        let snapshots_written: usize = reports.iter().map(|r| r.stats.snapshots_written).sum();

        let txn = self.db.begin().await?;
        let run_repo = SyncRunRepository::new(&txn);

        let result = entity::prelude::SyncRun::update_many()
            .col_expr(
                entity::sync_run::Column::Status,
                Expr::value(status.as_str().to_string()),
            )
            .col_expr(entity::sync_run::Column::FinishedAt, Expr::value(finished_at))
            .col_expr(entity::sync_run::Column::EntitiesSynced, Expr::value(synced as i32))
            .col_expr(entity::sync_run::Column::EntitiesFailed, Expr::value(failed as i32))
            .col_expr(
                entity::sync_run::Column::AccountsTouched,
                Expr::value(accounts_touched as i32),
            )
            .col_expr(
                entity::sync_run::Column::NewTransactions,
                Expr::value(new_transactions as i32),
            )
            .col_expr(
                entity::sync_run::Column::SnapshotsWritten,
                Expr::value(snapshots_written as i32),
            )
            .col_expr(entity::sync_run::Column::FailureReason, Expr::value(failure_reason))
            .filter(entity::sync_run::Column::Id.eq(run_id))
            .filter(entity::sync_run::Column::Status.eq(RunStatus::Running.as_str()))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return match run_repo.find_by_id(run_id).await? {
                Some(_) => Err(StoreError::AuditRecordFinalized(run_id).into()),
                None => Err(DbErr::RecordNotFound(format!("sync run {run_id}")).into()),
            };
        }

        if !reports.is_empty() {
            let outcomes = reports.iter().map(|report| {
                let failures = report.outcome.account_failures();
                let detail = if failures.is_empty() {
                    None
                } else {
                    serde_json::to_string(failures).ok()
                };

                entity::sync_run_outcome::ActiveModel {
                    sync_run_id: ActiveValue::Set(run_id),
                    entity_slug: ActiveValue::Set(report.entity.clone()),
                    outcome: ActiveValue::Set(report.outcome.kind().to_string()),
                    reason: ActiveValue::Set(report.outcome.reason()),
                    accounts_synced: ActiveValue::Set(report.stats.accounts_synced as i32),
                    accounts_failed: ActiveValue::Set(report.stats.accounts_failed as i32),
                    new_transactions: ActiveValue::Set(report.stats.new_transactions as i32),
                    snapshots_written: ActiveValue::Set(report.stats.snapshots_written as i32),
                    detail: ActiveValue::Set(detail),
                    ..Default::default()
                }
            });

            entity::prelude::SyncRunOutcome::insert_many(outcomes)
                .exec_without_returning(&txn)
                .await?;
        }

        let run = run_repo
            .find_by_id(run_id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("sync run {run_id}")))?;

        txn.commit().await?;

        Ok(run)
    }

    /// Closes runs left in `running` status by a process that stopped mid-run.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of runs marked as failed
    pub async fn fail_interrupted(&self, finished_at: NaiveDateTime) -> Result<u64, DbErr> {
        let result = entity::prelude::SyncRun::update_many()
            .col_expr(
                entity::sync_run::Column::Status,
                Expr::value(RunStatus::Failed.as_str().to_string()),
            )
            .col_expr(entity::sync_run::Column::FinishedAt, Expr::value(finished_at))
            .col_expr(
                entity::sync_run::Column::FailureReason,
                Expr::value("interrupted before completion".to_string()),
            )
            .filter(entity::sync_run::Column::Status.eq(RunStatus::Running.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn find_by_id(&self, run_id: i32) -> Result<Option<entity::sync_run::Model>, DbErr> {
        entity::prelude::SyncRun::find_by_id(run_id).one(self.db).await
    }

    /// Most recent runs first, each with its outcomes ordered by entity slug.
    pub async fn latest(&self, limit: u64) -> Result<Vec<SyncRunWithOutcomes>, DbErr> {
        let runs = entity::prelude::SyncRun::find()
            .order_by_desc(entity::sync_run::Column::StartedAt)
            .order_by_desc(entity::sync_run::Column::Id)
            .limit(limit)
            .all(self.db)
            .await?;

        if runs.is_empty() {
            return Ok(Vec::new());
        }

        let run_ids: Vec<i32> = runs.iter().map(|run| run.id).collect();
        let outcomes = entity::prelude::SyncRunOutcome::find()
            .filter(entity::sync_run_outcome::Column::SyncRunId.is_in(run_ids))
            .order_by_asc(entity::sync_run_outcome::Column::EntitySlug)
            .all(self.db)
            .await?;

        let mut by_run: HashMap<i32, Vec<entity::sync_run_outcome::Model>> = HashMap::new();
        for outcome in outcomes {
            by_run.entry(outcome.sync_run_id).or_default().push(outcome);
        }

        Ok(runs
            .into_iter()
            .map(|run| {
                let outcomes = by_run.remove(&run.id).unwrap_or_default();
                (run, outcomes)
            })
            .collect())
    }

    /// Outcomes recorded for one run.
    pub async fn outcomes(
        &self,
        run_id: i32,
    ) -> Result<Vec<entity::sync_run_outcome::Model>, DbErr> {
        entity::prelude::SyncRunOutcome::find()
            .filter(entity::sync_run_outcome::Column::SyncRunId.eq(run_id))
            .order_by_asc(entity::sync_run_outcome::Column::EntitySlug)
            .all(self.db)
            .await
    }
}
