use chrono::{Duration, Utc};
use empire::server::controller::balance::{get_balances, BalanceParams, STALE_BEYOND_LIMIT};
use sea_orm::ConnectionTrait;

use super::*;

fn params(entity_id: Option<&str>) -> Query<BalanceParams> {
    Query(BalanceParams {
        entity_id: entity_id.map(str::to_string),
    })
}

/// Tests that the latest snapshot of each account is returned.
///
/// Expected: 200 OK with the newest balance in minor units and no warning
#[tokio::test]
async fn returns_latest_balance_per_account() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let entity = test.store().insert_entity(TEST_ENTITY_SLUG).await?;
    let account = test.store().insert_account(entity.id, TEST_ACCOUNT_ID).await?;
    let now = Utc::now().naive_utc();
    test.store()
        .insert_snapshot(account.id, 100_000, now - Duration::hours(2))
        .await?;
    test.store()
        .insert_snapshot(account.id, 125_075, now - Duration::minutes(5))
        .await?;

    let result = get_balances(State(test.into_app_state()), params(Some(TEST_ENTITY_SLUG))).await;

    assert!(result.is_ok());
    let response = result.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let balances = body["data"]["balances"].as_array().unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0]["balance"], 125_075);
    assert_eq!(balances[0]["entityId"], TEST_ENTITY_SLUG);
    assert_eq!(balances[0]["externalAccountId"], TEST_ACCOUNT_ID);
    assert_eq!(body["data"]["isStale"], false);
    assert!(body["data"]["warning"].is_null());

    Ok(())
}

/// Tests that data older than the staleness window carries a warning.
///
/// Expected: 200 OK with the STALE_BEYOND_LIMIT warning
#[tokio::test]
async fn warns_when_balances_exceed_staleness_window() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let entity = test.store().insert_entity(TEST_ENTITY_SLUG).await?;
    let account = test.store().insert_account(entity.id, TEST_ACCOUNT_ID).await?;
    test.store()
        .insert_snapshot(account.id, 5_000, Utc::now().naive_utc() - Duration::days(3))
        .await?;

    let result = get_balances(State(test.into_app_state()), params(None)).await;

    assert!(result.is_ok());
    let body = body_json(result.unwrap().into_response()).await;
    assert_eq!(body["data"]["warning"], STALE_BEYOND_LIMIT);

    Ok(())
}

/// Tests that an unknown entity is a client error rather than an empty list.
///
/// Expected: Err with 400 BAD_REQUEST naming entityId
#[tokio::test]
async fn rejects_unknown_entity() -> Result<(), TestError> {
    let test = TestBuilder::new().with_entity(TEST_ENTITY_SLUG).build().await?;

    let result = get_balances(State(test.into_app_state()), params(Some("empire-unknown"))).await;

    assert!(result.is_err());
    let response = result.err().unwrap().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(error_fields(&body), vec!["entityId"]);

    Ok(())
}

/// Tests that a malformed slug is rejected before reaching the store.
///
/// Expected: Err with 400 BAD_REQUEST naming entityId
#[tokio::test]
async fn rejects_malformed_entity_slug() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    let result = get_balances(State(test.into_app_state()), params(Some("Empire Holdings!"))).await;

    assert!(result.is_err());
    let response = result.err().unwrap().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body_json(response).await), vec!["entityId"]);

    Ok(())
}

/// Tests that missing tables surface as a generic server error.
///
/// Expected: Err with 500 INTERNAL_SERVER_ERROR and no internal detail in the body
#[tokio::test]
async fn error_when_tables_missing() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    test.db
        .execute_unprepared("DROP TABLE balance_snapshot")
        .await?;

    let result = get_balances(State(test.into_app_state()), params(None)).await;

    assert!(result.is_err());
    let response = result.err().unwrap().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

    Ok(())
}
