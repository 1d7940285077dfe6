use chrono::NaiveDateTime;
use thiserror::Error;

/// Writes the reconciliation store refuses to apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A transaction update would move it backwards through its lifecycle.
    #[error("Rejected status change for transaction {external_id}: {from} -> {to}")]
    InvalidStateTransition {
        external_id: String,
        from: String,
        to: String,
    },
    /// A different balance was already recorded for this account and observation time.
    #[error("Conflicting balance snapshot for account {account_id} observed at {observed_at}")]
    ConflictingSnapshot {
        account_id: i32,
        observed_at: NaiveDateTime,
    },
    /// Snapshots must be appended in observation order.
    #[error(
        "Balance snapshot for account {account_id} observed at {observed_at} is older than latest snapshot at {latest}"
    )]
    OutOfOrderSnapshot {
        account_id: i32,
        observed_at: NaiveDateTime,
        latest: NaiveDateTime,
    },
    /// Sync run audit records are immutable once finalized.
    #[error("Sync run {0} has already been finalized")]
    AuditRecordFinalized(i32),
}
