//! Outcome types produced by entity sync workers and aggregated by the coordinator.

use chrono::NaiveDateTime;
use serde::Serialize;

/// What started a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Manual,
    Schedule,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Schedule => "schedule",
        }
    }
}

/// Lifecycle status of a sync run audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Step of an account sync that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStage {
    Balance,
    Transactions,
}

/// One failed step for one account inside an entity sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFailure {
    pub account_id: String,
    pub stage: SyncStage,
    pub reason: String,
}

/// Counters accumulated while syncing one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Accounts where every step succeeded
    pub accounts_synced: usize,
    /// Accounts where at least one step failed
    pub accounts_failed: usize,
    pub new_transactions: usize,
    pub updated_transactions: usize,
    pub snapshots_written: usize,
}

impl SyncStats {
    pub fn accounts_touched(&self) -> usize {
        self.accounts_synced + self.accounts_failed
    }

    pub fn add(&mut self, other: &SyncStats) {
        self.accounts_synced += other.accounts_synced;
        self.accounts_failed += other.accounts_failed;
        self.new_transactions += other.new_transactions;
        self.updated_transactions += other.updated_transactions;
        self.snapshots_written += other.snapshots_written;
    }
}

/// Result of syncing a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    Success {
        accounts_synced: usize,
        new_transactions: usize,
    },
    PartialFailure {
        succeeded_accounts: usize,
        failed_accounts: usize,
        reasons: Vec<AccountFailure>,
    },
    Failed {
        reason: String,
    },
    Skipped {
        reason: String,
    },
}

impl EntityOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::PartialFailure { .. } => "partial_failure",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }

    /// Success and partial failure both count as synced; some data was committed.
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::PartialFailure { .. })
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::PartialFailure { reasons, .. } => Some(
                reasons
                    .iter()
                    .map(|f| format!("{} {:?}: {}", f.account_id, f.stage, f.reason))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Self::Failed { reason } | Self::Skipped { reason } => Some(reason.clone()),
        }
    }

    pub fn account_failures(&self) -> &[AccountFailure] {
        match self {
            Self::PartialFailure { reasons, .. } => reasons,
            _ => &[],
        }
    }
}

/// Outcome of one entity paired with the counters it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub entity: String,
    pub outcome: EntityOutcome,
    pub stats: SyncStats,
}

impl EntityReport {
    pub fn failed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            outcome: EntityOutcome::Failed {
                reason: reason.into(),
            },
            stats: SyncStats::default(),
        }
    }

    pub fn skipped(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            outcome: EntityOutcome::Skipped {
                reason: reason.into(),
            },
            stats: SyncStats::default(),
        }
    }
}

/// Finalized view of a coordinator run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRunSummary {
    pub run_id: i32,
    pub trigger: TriggerSource,
    pub status: RunStatus,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub reports: Vec<EntityReport>,
    pub failure_reason: Option<String>,
}

impl SyncRunSummary {
    pub fn synced(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_synced()).count()
    }

    pub fn errors(&self) -> usize {
        self.reports.len() - self.synced()
    }

    pub fn totals(&self) -> SyncStats {
        let mut totals = SyncStats::default();
        for report in &self.reports {
            totals.add(&report.stats);
        }
        totals
    }

    pub fn outcome_for(&self, entity: &str) -> Option<&EntityOutcome> {
        self.reports
            .iter()
            .find(|r| r.entity == entity)
            .map(|r| &r.outcome)
    }
}

/// Advisory signal raised when too many entities fail in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncAlert {
    pub run_id: i32,
    pub failed_entities: Vec<String>,
    pub total_entities: usize,
    pub failure_ratio: f64,
}
