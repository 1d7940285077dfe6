use chrono::NaiveDate;
use empire::server::controller::transaction::{get_transactions, TransactionParams};

use super::*;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Context with two entities, one account each and a handful of transactions.
///
/// Returns the ID of the first entity's account.
async fn seeded() -> Result<(TestContext, i32), TestError> {
    let test = TestBuilder::new().build().await?;
    let holdings = test.store().insert_entity(TEST_ENTITY_SLUG).await?;
    let labs = test.store().insert_entity("empire-labs").await?;
    let operating = test.store().insert_account(holdings.id, TEST_ACCOUNT_ID).await?;
    let research = test.store().insert_account(labs.id, "acc-research-001").await?;

    let store = test.store();
    store
        .insert_transaction(operating.id, "tx-1", date("2026-01-10"), -25_000, "sent")
        .await?;
    store
        .insert_transaction(operating.id, "tx-2", date("2026-01-20"), 150_000, "sent")
        .await?;
    store
        .insert_transaction(operating.id, "tx-3", date("2026-02-01"), -4_599, "pending")
        .await?;
    store
        .insert_transaction(research.id, "tx-4", date("2026-01-25"), -1_000, "sent")
        .await?;

    Ok((test, operating.id))
}

fn external_ids(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["externalId"].as_str().unwrap().to_string())
        .collect()
}

/// Tests that an unfiltered search returns every transaction, newest first.
///
/// Expected: 200 OK with all 4 transactions and the default page window
#[tokio::test]
async fn returns_all_transactions_newest_first() -> Result<(), TestError> {
    let (test, _) = seeded().await?;

    let result = get_transactions(
        State(test.into_app_state()),
        Query(TransactionParams::default()),
    )
    .await;

    assert!(result.is_ok());
    let response = result.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(external_ids(&body), vec!["tx-3", "tx-4", "tx-2", "tx-1"]);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["limit"], 100);
    assert_eq!(body["data"]["offset"], 0);

    Ok(())
}

/// Tests entity, date and amount filters together.
///
/// Expected: 200 OK with only the matching transactions of the entity
#[tokio::test]
async fn filters_by_entity_date_and_amount() -> Result<(), TestError> {
    let (test, _) = seeded().await?;

    let params = TransactionParams {
        entity_id: Some(TEST_ENTITY_SLUG.to_string()),
        start_date: Some("2026-01-15".to_string()),
        end_date: Some("2026-02-28".to_string()),
        min_amount: Some("-100.00".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_ok());
    let body = body_json(result.unwrap().into_response()).await;
    assert_eq!(external_ids(&body), vec!["tx-3", "tx-2"]);
    assert_eq!(body["data"]["items"][0]["amount"], -4_599);

    Ok(())
}

/// Tests pagination over a single account.
///
/// Expected: 200 OK with the second page and the total of the unpaginated match
#[tokio::test]
async fn paginates_account_transactions() -> Result<(), TestError> {
    let (test, account_id) = seeded().await?;

    let params = TransactionParams {
        account_id: Some(account_id.to_string()),
        limit: Some("2".to_string()),
        offset: Some("2".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_ok());
    let body = body_json(result.unwrap().into_response()).await;
    assert_eq!(external_ids(&body), vec!["tx-1"]);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["limit"], 2);
    assert_eq!(body["data"]["offset"], 2);

    Ok(())
}

/// Tests that the free text search matches the description.
///
/// Expected: 200 OK with the single matching transaction
#[tokio::test]
async fn searches_description() -> Result<(), TestError> {
    let (test, _) = seeded().await?;

    let params = TransactionParams {
        search: Some("  tx-4 ".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_ok());
    let body = body_json(result.unwrap().into_response()).await;
    assert_eq!(external_ids(&body), vec!["tx-4"]);

    Ok(())
}

/// Tests that every invalid parameter is reported in one response.
///
/// Expected: Err with 400 BAD_REQUEST naming each invalid field
#[tokio::test]
async fn reports_every_invalid_parameter() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    let params = TransactionParams {
        account_id: Some("0".to_string()),
        start_date: Some("02/01/2026".to_string()),
        min_amount: Some("12.345".to_string()),
        limit: Some("1001".to_string()),
        offset: Some("-1".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_err());
    let response = result.err().unwrap().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        error_fields(&body),
        vec!["accountId", "startDate", "minAmount", "limit", "offset"]
    );

    Ok(())
}

/// Tests that offsets beyond what the database can bind are rejected.
///
/// Expected: Err with 400 BAD_REQUEST naming only offset
#[tokio::test]
async fn rejects_offset_beyond_storage_range() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    for offset in ["9223372036854775808".to_string(), u64::MAX.to_string()] {
        let params = TransactionParams {
            offset: Some(offset),
            ..Default::default()
        };
        let result = get_transactions(State(test.into_app_state()), Query(params)).await;

        assert!(result.is_err());
        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(error_fields(&body), vec!["offset"]);
    }

    Ok(())
}

/// Tests that inverted ranges are rejected.
///
/// Expected: Err with 400 BAD_REQUEST naming endDate and maxAmount
#[tokio::test]
async fn rejects_inverted_ranges() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    let params = TransactionParams {
        start_date: Some("2026-02-10".to_string()),
        end_date: Some("2026-02-01".to_string()),
        min_amount: Some("50".to_string()),
        max_amount: Some("-50".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_err());
    let body = body_json(result.err().unwrap().into_response()).await;
    assert_eq!(error_fields(&body), vec!["endDate", "maxAmount"]);

    Ok(())
}

/// Tests that an unknown entity is a client error.
///
/// Expected: Err with 400 BAD_REQUEST naming entityId
#[tokio::test]
async fn rejects_unknown_entity() -> Result<(), TestError> {
    let (test, _) = seeded().await?;

    let params = TransactionParams {
        entity_id: Some("empire-unknown".to_string()),
        ..Default::default()
    };
    let result = get_transactions(State(test.into_app_state()), Query(params)).await;

    assert!(result.is_err());
    let response = result.err().unwrap().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body_json(response).await), vec!["entityId"]);

    Ok(())
}
