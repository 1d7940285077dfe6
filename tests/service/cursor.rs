use chrono::NaiveDate;
use empire::server::data::transaction::BankTransactionRepository;

use super::*;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Tests that a re-sync only fetches from the last recorded transaction date.
///
/// The stored account's latest transaction is dated 2026-02-01. The provider returns three
/// newer transactions and two older ones the cursor should have excluded.
///
/// Expected: the request carries start=2026-02-01 and exactly 3 transactions are inserted
#[tokio::test]
async fn resync_fetches_from_last_transaction_date() -> Result<(), TestError> {
    let account = factory::mock_account(TEST_ACCOUNT_ID, 500.0);

    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_accounts_endpoint(TEST_TOKEN, vec![account.clone()], 1)
        .with_account_endpoint(TEST_TOKEN, account, 1)
        .with_transactions_endpoint(
            TEST_TOKEN,
            TEST_ACCOUNT_ID,
            Some("2026-02-01"),
            vec![
                factory::mock_transaction("tx-new-1", "2026-02-02", -10.0, "sent"),
                factory::mock_transaction("tx-new-2", "2026-02-02", 250.0, "sent"),
                factory::mock_transaction("tx-new-3", "2026-02-03", -99.99, "pending"),
                factory::mock_transaction("tx-old-1", "2026-01-30", -1.0, "sent"),
                factory::mock_transaction("tx-old-2", "2026-01-15", -2.0, "sent"),
            ],
            1,
        )
        .build()
        .await?;

    let entity = test.store().insert_entity(TEST_ENTITY_SLUG).await?;
    let stored = test.store().insert_account(entity.id, TEST_ACCOUNT_ID).await?;
    test.store()
        .insert_transaction(stored.id, "tx-seen", date("2026-02-01"), -500, "sent")
        .await?;

    let (summary, _) = test.coordinator().run_sync(None).await.unwrap();

    assert_eq!(summary.totals().new_transactions, 3);
    assert!(matches!(
        summary.outcome_for(TEST_ENTITY_SLUG),
        Some(EntityOutcome::Success { new_transactions: 3, .. })
    ));

    let repository = BankTransactionRepository::new(&test.db);
    for external_id in ["tx-new-1", "tx-new-2", "tx-new-3"] {
        assert!(repository
            .find_by_external_id(stored.id, external_id)
            .await?
            .is_some());
    }
    for external_id in ["tx-old-1", "tx-old-2"] {
        assert!(repository
            .find_by_external_id(stored.id, external_id)
            .await?
            .is_none());
    }
    assert_eq!(repository.last_cursor(stored.id).await?, Some(date("2026-02-03")));
    test.assert_mocks();

    Ok(())
}

/// Tests that the first sync of an account fetches its full history.
///
/// Expected: every returned transaction inserted, however old
#[tokio::test]
async fn first_sync_fetches_full_history() -> Result<(), TestError> {
    let account = factory::mock_account(TEST_ACCOUNT_ID, 500.0);

    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_accounts_endpoint(TEST_TOKEN, vec![account.clone()], 1)
        .with_account_endpoint(TEST_TOKEN, account, 1)
        .with_transactions_endpoint(
            TEST_TOKEN,
            TEST_ACCOUNT_ID,
            None,
            vec![
                factory::mock_transaction("tx-1", "2025-12-31", -1.0, "sent"),
                factory::mock_transaction("tx-2", "2026-01-15", -2.0, "sent"),
            ],
            1,
        )
        .build()
        .await?;

    let (summary, _) = test.coordinator().run_sync(None).await.unwrap();

    assert_eq!(summary.totals().new_transactions, 2);
    test.assert_mocks();

    Ok(())
}
