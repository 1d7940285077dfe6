//! Provider JSON payload factories.
//!
//! Payloads are built as raw JSON so tests exercise the same parsing path as real responses.

use serde_json::{json, Value};

/// Create a checking account payload with a balance.
///
/// # Arguments
/// - `account_id` - Provider account ID
/// - `balance` - Current balance in major units, e.g. `1250.75`
///
/// # Returns
/// - `Value` - Account JSON as returned by `GET accounts` and `GET account/{id}`
pub fn mock_account(account_id: &str, balance: f64) -> Value {
    json!({
        "id": account_id,
        "name": format!("Operating {account_id}"),
        "status": "active",
        "kind": "checking",
        "routingNumber": "021000021",
        "accountNumber": "9876543210",
        "currentBalance": balance,
        "availableBalance": balance,
        "currency": "USD"
    })
}

/// Create a transaction payload created at noon UTC on `date`.
///
/// # Arguments
/// - `transaction_id` - Provider transaction ID
/// - `date` - Creation date, `YYYY-MM-DD`
/// - `amount` - Signed amount in major units
/// - `status` - Provider status (`pending`, `sent`, `cancelled`, `failed`)
pub fn mock_transaction(transaction_id: &str, date: &str, amount: f64, status: &str) -> Value {
    let posted_at = if status == "sent" {
        Value::String(format!("{date}T18:00:00Z"))
    } else {
        Value::Null
    };

    json!({
        "id": transaction_id,
        "amount": amount,
        "status": status,
        "createdAt": format!("{date}T12:00:00Z"),
        "postedAt": posted_at,
        "bankDescription": format!("Payment {transaction_id}"),
        "counterpartyName": "Acme Supplies",
        "note": null,
        "mercuryCategory": "Software",
        "kind": "externalTransfer"
    })
}

/// Body of `GET accounts`
pub fn accounts_body(accounts: Vec<Value>) -> Value {
    json!({ "accounts": accounts })
}

/// Body of `GET account/{id}/transactions`
pub fn transactions_body(transactions: Vec<Value>) -> Value {
    json!({
        "total": transactions.len(),
        "transactions": transactions
    })
}
