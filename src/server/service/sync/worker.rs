//! Per-entity sync worker.
//!
//! Fetches the accounts of one business entity, then the balance and the new transactions of
//! each account, and commits everything to the reconciliation store. Failures are contained at
//! the smallest unit possible: a failed transaction fetch does not undo the balance of the same
//! account, and a failed account does not stop its siblings.

use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};

use crate::server::{
    credential::AccessToken,
    data::{
        account::BankAccountRepository,
        balance::{BalanceSnapshotRepository, SnapshotCommit},
        transaction::{BankTransactionRepository, TransactionCommit},
    },
    error::{store::StoreError, Error},
    model::{
        outcome::{AccountFailure, EntityOutcome, EntityReport, SyncStage, SyncStats},
        provider::{AccountRecord, TransactionRecord},
    },
    service::sync::SyncContext,
};

/// Result of syncing a single account.
#[derive(Debug)]
struct AccountSync {
    external_id: String,
    snapshot_written: bool,
    balance: Result<(), String>,
    transactions: Result<TransactionCommit, String>,
}

impl AccountSync {
    fn failed(external_id: String, reason: String) -> Self {
        Self {
            external_id,
            snapshot_written: false,
            balance: Err(reason.clone()),
            transactions: Err(reason),
        }
    }

    fn is_success(&self) -> bool {
        self.balance.is_ok() && self.transactions.is_ok()
    }

    fn is_total_failure(&self) -> bool {
        self.balance.is_err() && self.transactions.is_err()
    }

    fn failures(&self) -> Vec<AccountFailure> {
        let mut failures = Vec::new();
        if let Err(reason) = &self.balance {
            failures.push(AccountFailure {
                account_id: self.external_id.clone(),
                stage: SyncStage::Balance,
                reason: reason.clone(),
            });
        }
        if let Err(reason) = &self.transactions {
            failures.push(AccountFailure {
                account_id: self.external_id.clone(),
                stage: SyncStage::Transactions,
                reason: reason.clone(),
            });
        }
        failures
    }
}

/// Syncs one business entity.
pub struct EntitySyncWorker<'a> {
    ctx: &'a SyncContext,
}

impl<'a> EntitySyncWorker<'a> {
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Syncs every account of an entity.
    ///
    /// # Arguments
    /// - `entity` - Business entity row to sync
    /// - `observed_at` - Observation time stamped on balance snapshots, the sync cycle start
    ///
    /// # Returns
    /// An [`EntityReport`] that is:
    /// - `Skipped` when no access token is registered for the entity
    /// - `Failed` when the account list cannot be fetched, or every account failed every step
    /// - `PartialFailure` when some accounts or steps failed
    /// - `Success` otherwise
    pub async fn sync_entity(
        &self,
        entity: &entity::business_entity::Model,
        observed_at: NaiveDateTime,
    ) -> EntityReport {
        let token = match self.ctx.credentials.resolve(&entity.slug) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(entity = %entity.slug, "Skipping entity sync: {}", e);
                return EntityReport::skipped(&entity.slug, e.to_string());
            }
        };

        let accounts = match self.ctx.client.list_accounts(&token).await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::error!(entity = %entity.slug, "Failed to fetch accounts: {}", e);
                return EntityReport::failed(&entity.slug, e.to_string());
            }
        };

        let results: Vec<AccountSync> = stream::iter(accounts)
            .map(|account| self.sync_account(entity.id, &token, account, observed_at))
            .buffer_unordered(self.ctx.settings.account_concurrency.max(1))
            .collect()
            .await;

        let report = Self::summarize(&entity.slug, results);
        tracing::info!(
            entity = %entity.slug,
            outcome = report.outcome.kind(),
            accounts_synced = report.stats.accounts_synced,
            accounts_failed = report.stats.accounts_failed,
            new_transactions = report.stats.new_transactions,
            snapshots_written = report.stats.snapshots_written,
            "Entity sync finished"
        );

        report
    }

    /// Folds per-account results into the entity outcome.
    fn summarize(slug: &str, results: Vec<AccountSync>) -> EntityReport {
        let mut stats = SyncStats::default();
        let mut failures = Vec::new();

        for result in &results {
            if result.is_success() {
                stats.accounts_synced += 1;
            } else {
                stats.accounts_failed += 1;
                failures.extend(result.failures());
            }
            if result.snapshot_written {
                stats.snapshots_written += 1;
            }
            if let Ok(commit) = &result.transactions {
                stats.new_transactions += commit.inserted;
                stats.updated_transactions += commit.updated;
            }
        }

        let outcome = if stats.accounts_failed == 0 {
            EntityOutcome::Success {
                accounts_synced: stats.accounts_synced,
                new_transactions: stats.new_transactions,
            }
        } else if results.iter().all(AccountSync::is_total_failure) {
            EntityOutcome::Failed {
                reason: failures
                    .iter()
                    .map(|f| f.reason.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            }
        } else {
            EntityOutcome::PartialFailure {
                succeeded_accounts: stats.accounts_synced,
                failed_accounts: stats.accounts_failed,
                reasons: failures,
            }
        };

        EntityReport {
            entity: slug.to_string(),
            outcome,
            stats,
        }
    }

    async fn sync_account(
        &self,
        entity_id: i32,
        token: &AccessToken,
        account: AccountRecord,
        observed_at: NaiveDateTime,
    ) -> AccountSync {
        let stored = match BankAccountRepository::new(&self.ctx.db)
            .upsert(entity_id, &account)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(account = %account.external_id, "Failed to store account: {}", e);
                return AccountSync::failed(account.external_id, e.to_string());
            }
        };

        let (balance, transactions) = tokio::join!(
            self.sync_balance(&stored, token, observed_at),
            self.sync_transactions(&stored, token),
        );

        let (snapshot_written, balance) = match balance {
            Ok(written) => (written, Ok(())),
            Err(e) => {
                tracing::error!(account = %stored.external_id, "Balance sync failed: {}", e);
                (false, Err(e.to_string()))
            }
        };
        let transactions = transactions.map_err(|e| {
            tracing::error!(account = %stored.external_id, "Transaction sync failed: {}", e);
            e.to_string()
        });

        AccountSync {
            external_id: stored.external_id,
            snapshot_written,
            balance,
            transactions,
        }
    }

    /// Fetches and commits the current balance, returns whether a new snapshot was written.
    async fn sync_balance(
        &self,
        account: &entity::bank_account::Model,
        token: &AccessToken,
        observed_at: NaiveDateTime,
    ) -> Result<bool, Error> {
        let balance = self
            .ctx
            .client
            .get_balance(token, &account.external_id)
            .await?;

        match BalanceSnapshotRepository::new(&self.ctx.db)
            .commit(account.id, &balance, observed_at)
            .await
        {
            Ok(SnapshotCommit::Inserted(_)) => Ok(true),
            Ok(SnapshotCommit::Unchanged(_)) => Ok(false),
            // The first observation of the cycle stands
            Err(Error::StoreError(e @ StoreError::ConflictingSnapshot { .. })) => {
                tracing::warn!(account = %account.external_id, "Skipping balance snapshot: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches transactions since the stored cursor and commits them.
    async fn sync_transactions(
        &self,
        account: &entity::bank_account::Model,
        token: &AccessToken,
    ) -> Result<TransactionCommit, Error> {
        let repository = BankTransactionRepository::new(&self.ctx.db);
        let since = repository.last_cursor(account.id).await?;

        let records = self
            .ctx
            .client
            .list_transactions(token, &account.external_id, since)
            .await?;

        let records = Self::since(records, since);
        let commit = repository.commit_many(account.id, &records).await?;

        tracing::debug!(
            account = %account.external_id,
            since = ?since,
            inserted = commit.inserted,
            updated = commit.updated,
            unchanged = commit.unchanged,
            rejected = commit.rejected.len(),
            "Committed transactions"
        );

        Ok(commit)
    }

    /// Drops records dated before the cursor even if the provider returned them.
    fn since(records: Vec<TransactionRecord>, since: Option<NaiveDate>) -> Vec<TransactionRecord> {
        match since {
            Some(since) => records.into_iter().filter(|r| r.date >= since).collect(),
            None => records,
        }
    }
}
