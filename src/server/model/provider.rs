//! Normalized records produced from provider payloads.
//!
//! Provider JSON is parsed into these types at the client boundary. Amounts are integer minor
//! units, account and routing numbers are already masked, and statuses are the closed set the
//! reconciliation store understands.

use chrono::{NaiveDate, NaiveDateTime};

/// Kind of bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "savings" => Some(Self::Savings),
            _ => None,
        }
    }
}

/// Lifecycle status of a bank account. Closed accounts are retained for history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    /// Maps provider account statuses. Anything that is not closed or archived is active.
    pub fn from_provider(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "closed" | "archived" | "deleted" => Self::Closed,
            _ => Self::Active,
        }
    }
}

/// A bank account discovered for an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub external_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub status: AccountStatus,
    pub masked_routing_number: Option<String>,
    pub masked_account_number: Option<String>,
}

/// Current balance of an account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub external_account_id: String,
    pub balance: i64,
    pub available: Option<i64>,
    pub currency: String,
}

/// Settlement status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Posted,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
            Self::Failed => "failed",
        }
    }

    /// Parses a status previously written by [`TransactionStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "posted" => Some(Self::Posted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Maps provider transaction statuses onto the stored status set.
    pub fn from_provider(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "sent" | "posted" => Some(Self::Posted),
            "cancelled" | "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether a stored transaction in this status may be updated to `next`.
    ///
    /// Pending transactions settle to posted or failed. Settled transactions never move.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _) | (Self::Posted, Self::Posted) | (Self::Failed, Self::Failed)
        )
    }
}

/// A provider ledger entry normalized for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub external_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    pub status: TransactionStatus,
    pub category: Option<String>,
    pub counterparty: Option<String>,
    pub note: Option<String>,
    pub posted_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_settle_either_way() {
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Posted));
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Failed));
        assert!(TransactionStatus::Pending.can_transition_to(TransactionStatus::Pending));
    }

    #[test]
    fn settled_transactions_never_move() {
        assert!(!TransactionStatus::Posted.can_transition_to(TransactionStatus::Pending));
        assert!(!TransactionStatus::Posted.can_transition_to(TransactionStatus::Failed));
        assert!(!TransactionStatus::Failed.can_transition_to(TransactionStatus::Posted));
        assert!(TransactionStatus::Posted.can_transition_to(TransactionStatus::Posted));
    }

    #[test]
    fn maps_provider_statuses() {
        assert_eq!(
            TransactionStatus::from_provider("sent"),
            Some(TransactionStatus::Posted)
        );
        assert_eq!(
            TransactionStatus::from_provider("cancelled"),
            Some(TransactionStatus::Failed)
        );
        assert_eq!(TransactionStatus::from_provider("reversed"), None);
    }
}
