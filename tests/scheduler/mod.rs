//! Tests for the cron scheduler driving scheduled sync runs.

use std::time::Duration;

use empire::server::{data::sync_run::SyncRunRepository, scheduler::cron::start_scheduler};
use empire_test_utils::prelude::*;

use crate::util::TestContextExt;

/// Tests that an invalid cron expression is rejected at startup.
///
/// Expected: Err from start_scheduler
#[tokio::test]
async fn rejects_invalid_cron_expression() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    let result = start_scheduler("every five minutes", &test.coordinator()).await;

    assert!(result.is_err());

    Ok(())
}

/// Tests that each tick starts a scheduled run.
///
/// Expected: at least one run recorded with the schedule trigger within a few seconds
#[tokio::test]
async fn tick_starts_scheduled_run() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_mock_endpoint(|server| {
            server
                .mock("GET", "/accounts")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"accounts":[]}"#)
                .expect_at_least(1)
                .create()
        })
        .build()
        .await?;
    let coordinator = test.coordinator();

    let mut scheduler = start_scheduler("* * * * * *", &coordinator).await.unwrap();

    let mut runs = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        runs = SyncRunRepository::new(&test.db).latest(10).await?;
        if runs.iter().any(|(run, _)| run.status == "completed") {
            break;
        }
    }
    scheduler.shutdown().await.unwrap();

    assert!(!runs.is_empty());
    assert!(runs.iter().all(|(run, _)| run.trigger == "schedule"));
    assert!(runs.iter().any(|(run, _)| run.status == "completed"));
    test.assert_mocks();

    Ok(())
}
