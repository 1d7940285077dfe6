use sea_orm::EntityTrait;

use super::*;

static LABS_SLUG: &str = "empire-labs";
static LABS_TOKEN: &str = "secret-token:labs00000001";
static VENTURES_SLUG: &str = "empire-ventures";
static VENTURES_TOKEN: &str = "secret-token:ventures0001";

/// Tests that one entity's provider failure does not affect its siblings.
///
/// The provider answers 500 to the second entity's account listing. The first and third
/// entities must still sync and commit their data in the same run.
///
/// Expected: first and third entities succeed, second fails, one run records all three
#[tokio::test]
async fn failing_entity_does_not_block_siblings() -> Result<(), TestError> {
    let holdings_account = factory::mock_account("acc-holdings", 1250.75);
    let ventures_account = factory::mock_account("acc-ventures", 80.0);

    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_entity(LABS_SLUG)
        .with_entity(VENTURES_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_credential(LABS_SLUG, LABS_TOKEN)
        .with_credential(VENTURES_SLUG, VENTURES_TOKEN)
        .with_mock_endpoint(|server| {
            server
                .mock("GET", "/accounts")
                .match_header("authorization", format!("Bearer {}", LABS_TOKEN).as_str())
                .with_status(500)
                .with_header("content-type", "application/json")
                .with_body(json!({ "message": "upstream unavailable" }).to_string())
                .expect(1)
                .create()
        })
        .with_accounts_endpoint(TEST_TOKEN, vec![holdings_account.clone()], 1)
        .with_accounts_endpoint(VENTURES_TOKEN, vec![ventures_account.clone()], 1)
        .with_account_endpoint(TEST_TOKEN, holdings_account, 1)
        .with_account_endpoint(VENTURES_TOKEN, ventures_account, 1)
        .with_transactions_endpoint(
            TEST_TOKEN,
            "acc-holdings",
            None,
            vec![
                factory::mock_transaction("tx-h1", "2026-02-02", -42.0, "sent"),
                factory::mock_transaction("tx-h2", "2026-02-03", 900.0, "pending"),
            ],
            1,
        )
        .with_transactions_endpoint(
            VENTURES_TOKEN,
            "acc-ventures",
            None,
            vec![factory::mock_transaction("tx-v1", "2026-02-02", -5.0, "sent")],
            1,
        )
        .build()
        .await?;
    let coordinator = test.coordinator();

    let (summary, coalesced) = coordinator.run_sync(None).await.unwrap();

    assert!(!coalesced);
    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.synced(), 2);
    assert_eq!(summary.errors(), 1);
    assert!(matches!(
        summary.outcome_for(TEST_ENTITY_SLUG),
        Some(EntityOutcome::Success { accounts_synced: 1, new_transactions: 2 })
    ));
    assert!(matches!(
        summary.outcome_for(LABS_SLUG),
        Some(EntityOutcome::Failed { .. })
    ));
    assert!(matches!(
        summary.outcome_for(VENTURES_SLUG),
        Some(EntityOutcome::Success { accounts_synced: 1, new_transactions: 1 })
    ));

    let transactions = entity::prelude::BankTransaction::find().all(&test.db).await?;
    assert_eq!(transactions.len(), 3);
    let snapshots = entity::prelude::BalanceSnapshot::find().all(&test.db).await?;
    assert_eq!(snapshots.len(), 2);

    let runs = SyncRunRepository::new(&test.db).latest(10).await?;
    assert_eq!(runs.len(), 1);
    let (run, outcomes) = &runs[0];
    assert_eq!(run.entities_synced, 2);
    assert_eq!(run.entities_failed, 1);
    assert_eq!(outcomes.len(), 3);
    test.assert_mocks();

    Ok(())
}

/// Tests that an entity without a token is skipped while the others sync.
///
/// Expected: the entity without a credential is skipped and never reaches the provider
#[tokio::test]
async fn entity_without_credential_is_skipped() -> Result<(), TestError> {
    let account = factory::mock_account("acc-holdings", 10.0);

    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_entity(LABS_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_accounts_endpoint(TEST_TOKEN, vec![account.clone()], 1)
        .with_accounts_endpoint(LABS_TOKEN, vec![], 0)
        .with_account_endpoint(TEST_TOKEN, account, 1)
        .with_transactions_endpoint(TEST_TOKEN, "acc-holdings", None, vec![], 1)
        .build()
        .await?;
    let coordinator = test.coordinator();

    let (summary, _) = coordinator.run_sync(None).await.unwrap();

    assert!(matches!(
        summary.outcome_for(TEST_ENTITY_SLUG),
        Some(EntityOutcome::Success { .. })
    ));
    assert!(matches!(
        summary.outcome_for(LABS_SLUG),
        Some(EntityOutcome::Skipped { .. })
    ));

    let labs = test.store().insert_entity(LABS_SLUG).await?;
    let labs_accounts = BankAccountRepository::new(&test.db)
        .get_by_entity(Some(labs.id))
        .await?;
    assert!(labs_accounts.is_empty());
    test.assert_mocks();

    Ok(())
}
