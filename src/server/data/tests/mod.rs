
use chrono::{NaiveDate, NaiveDateTime};
use empire_test_utils::prelude::*;

use crate::server::model::provider::{BalanceRecord, TransactionRecord, TransactionStatus};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn timestamp(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn balance(balance: i64) -> BalanceRecord {
    BalanceRecord {
        external_account_id: TEST_ACCOUNT_ID.to_string(),
        balance,
        available: Some(balance),
        currency: "USD".to_string(),
    }
}

fn transaction(external_id: &str, day: &str, amount: i64, status: TransactionStatus) -> TransactionRecord {
    TransactionRecord {
        external_id: external_id.to_string(),
        date: date(day),
        description: format!("Payment {external_id}"),
        amount,
        status,
        category: None,
        counterparty: Some("Acme Supplies".to_string()),
        note: None,
        posted_at: None,
    }
}

/// Builds a migrated database with one entity and one account, returning the account ID.
async fn setup_account() -> Result<(TestContext, i32), TestError> {
    let test = TestBuilder::new().with_entity(TEST_ENTITY_SLUG).build().await?;
    let entity = test.store().insert_entity(TEST_ENTITY_SLUG).await?;
    let account = test.store().insert_account(entity.id, TEST_ACCOUNT_ID).await?;

    Ok((test, account.id))
}
