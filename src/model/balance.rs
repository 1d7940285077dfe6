use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Latest observed balance for one bank account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    pub entity_id: String,
    pub account_id: i32,
    pub external_account_id: String,
    pub account_name: String,
    pub account_kind: String,
    pub account_status: String,
    pub masked_account_number: Option<String>,
    /// Ledger balance in minor currency units
    pub balance: i64,
    /// Available balance in minor currency units
    pub available: Option<i64>,
    pub currency: String,
    pub observed_at: NaiveDateTime,
}

/// Cached balances along with their freshness
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalancesDto {
    pub balances: Vec<BalanceDto>,
    /// The cache entry expired and a background refresh has been requested
    pub is_stale: bool,
    /// Set to `STALE_BEYOND_LIMIT` when the data exceeds the maximum staleness window
    pub warning: Option<String>,
}
