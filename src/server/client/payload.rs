//! Provider JSON shapes and their conversion into normalized records.
//!
//! Every field the sync engine relies on is parsed explicitly. Any mismatch (unknown account
//! kind or transaction status, sub-cent amounts, unparseable timestamps) becomes
//! `ProviderError::InvalidResponse` instead of leaking loosely typed data inward.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Number;

use crate::server::{
    error::provider::ProviderError,
    model::provider::{
        AccountKind, AccountRecord, AccountStatus, BalanceRecord, TransactionRecord,
        TransactionStatus,
    },
    util::{amount::to_minor_units, mask::mask_account_number},
};

const DEFAULT_CURRENCY: &str = "USD";

/// Body of `GET accounts`.
#[derive(Debug, Deserialize)]
pub struct AccountsPayload {
    pub accounts: Vec<AccountPayload>,
}

/// A provider account, as returned by `GET accounts` and `GET account/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub id: String,
    pub name: String,
    pub status: String,
    pub kind: String,
    #[serde(default)]
    pub routing_number: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub current_balance: Option<Number>,
    #[serde(default)]
    pub available_balance: Option<Number>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Body of `GET account/{id}/transactions`.
#[derive(Debug, Deserialize)]
pub struct TransactionsPayload {
    #[serde(default)]
    pub total: Option<u64>,
    pub transactions: Vec<TransactionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub id: String,
    pub amount: Number,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub bank_description: Option<String>,
    #[serde(default)]
    pub counterparty_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub mercury_category: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

fn invalid(context: impl Into<String>, reason: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
        context: context.into(),
        reason: reason.into(),
    }
}

fn minor_units(context: &str, field: &str, value: &Number) -> Result<i64, ProviderError> {
    to_minor_units(&value.to_string()).ok_or_else(|| {
        invalid(
            context,
            format!("{field} {value} is not representable in minor units"),
        )
    })
}

fn timestamp(context: &str, field: &str, value: &str) -> Result<NaiveDateTime, ProviderError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.naive_utc())
        .map_err(|e| invalid(context, format!("{field} {value:?} is not RFC 3339: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AccountPayload {
    /// Converts into an account record, masking routing and account numbers.
    pub fn into_record(self) -> Result<AccountRecord, ProviderError> {
        let context = format!("account {}", self.id);
        let kind = AccountKind::parse(&self.kind)
            .ok_or_else(|| invalid(&context, format!("unknown account kind {:?}", self.kind)))?;

        Ok(AccountRecord {
            status: AccountStatus::from_provider(&self.status),
            masked_routing_number: self.routing_number.as_deref().map(mask_account_number),
            masked_account_number: self.account_number.as_deref().map(mask_account_number),
            external_id: self.id,
            name: self.name,
            kind,
        })
    }

    /// Extracts the current balance of the account.
    pub fn into_balance(self) -> Result<BalanceRecord, ProviderError> {
        let context = format!("account {} balance", self.id);
        let current = self
            .current_balance
            .as_ref()
            .ok_or_else(|| invalid(&context, "currentBalance is missing"))?;
        let balance = minor_units(&context, "currentBalance", current)?;
        let available = self
            .available_balance
            .as_ref()
            .map(|value| minor_units(&context, "availableBalance", value))
            .transpose()?;

        Ok(BalanceRecord {
            external_account_id: self.id,
            balance,
            available,
            currency: non_empty(self.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

impl TransactionPayload {
    /// Converts into a transaction record.
    ///
    /// The ledger date is the UTC date the transaction was created. The description falls
    /// back from the bank description to the counterparty and then to the transaction kind.
    pub fn into_record(self) -> Result<TransactionRecord, ProviderError> {
        let context = format!("transaction {}", self.id);
        let amount = minor_units(&context, "amount", &self.amount)?;
        let status = TransactionStatus::from_provider(&self.status)
            .ok_or_else(|| invalid(&context, format!("unknown status {:?}", self.status)))?;
        let created_at = timestamp(&context, "createdAt", &self.created_at)?;
        let posted_at = non_empty(self.posted_at)
            .map(|value| timestamp(&context, "postedAt", &value))
            .transpose()?;

        let counterparty = non_empty(self.counterparty_name);
        let description = non_empty(self.bank_description)
            .or_else(|| counterparty.clone())
            .or_else(|| non_empty(self.kind))
            .unwrap_or_default();

        Ok(TransactionRecord {
            external_id: self.id,
            date: created_at.date(),
            description,
            amount,
            status,
            category: non_empty(self.mercury_category),
            counterparty,
            note: non_empty(self.note),
            posted_at,
        })
    }
}
