use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of an on-demand sync request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResultDto {
    /// Identifier of the run that served this request, absent if the run could not start
    pub run_id: Option<i32>,
    /// Entities that synced fully or partially
    pub synced: usize,
    /// Entities that failed or were skipped
    pub errors: usize,
    pub status: String,
    /// The request joined a run that was already in flight
    pub coalesced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityOutcomeDto {
    pub entity_id: String,
    pub outcome: String,
    pub reason: Option<String>,
    pub accounts_synced: i32,
    pub accounts_failed: i32,
    pub new_transactions: i32,
    pub snapshots_written: i32,
}

/// Audit record of a single coordinator run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunDto {
    pub id: i32,
    pub trigger: String,
    pub status: String,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub entities_synced: i32,
    pub entities_failed: i32,
    pub accounts_touched: i32,
    pub new_transactions: i32,
    pub snapshots_written: i32,
    pub failure_reason: Option<String>,
    pub outcomes: Vec<EntityOutcomeDto>,
}
