use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: i32,
    pub account_id: i32,
    pub external_id: String,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount in minor currency units
    pub amount: i64,
    pub status: String,
    pub category: Option<String>,
    pub counterparty: Option<String>,
    pub note: Option<String>,
    pub posted_at: Option<NaiveDateTime>,
}

/// One page of transactions matching a filter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPageDto {
    pub items: Vec<TransactionDto>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
