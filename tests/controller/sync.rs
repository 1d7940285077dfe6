use empire::server::controller::sync::{get_sync_runs, trigger_sync, SyncParams, SyncRunsParams};

use super::*;

/// Tests that an on-demand sync reports the run it served.
///
/// Expected: 200 OK with the run ID, one synced entity and a completed status
#[tokio::test]
async fn trigger_sync_reports_run_result() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_accounts_endpoint(TEST_TOKEN, vec![], 1)
        .build()
        .await?;

    let response = trigger_sync(State(test.into_app_state()), Query(SyncParams::default()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["runId"].is_i64());
    assert_eq!(body["data"]["synced"], 1);
    assert_eq!(body["data"]["errors"], 0);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["coalesced"], false);
    test.assert_mocks();

    Ok(())
}

/// Tests that provider failures are counted, not surfaced as an HTTP error.
///
/// Expected: 200 OK with one error and no synced entity
#[tokio::test]
async fn trigger_sync_counts_failed_entities() -> Result<(), TestError> {
    let mut test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .build()
        .await?;
    let mock = test.provider().create_error_endpoint(
        "/accounts",
        401,
        serde_json::json!({ "message": "invalid token" }),
        1,
    );
    test.keep_mock(mock);

    let response = trigger_sync(State(test.into_app_state()), Query(SyncParams::default()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["synced"], 0);
    assert_eq!(body["data"]["errors"], 1);
    assert!(!body.to_string().contains(TEST_TOKEN));
    test.assert_mocks();

    Ok(())
}

/// Tests that a scoped sync only touches the named entities.
///
/// Expected: 200 OK, the other entity's provider endpoint is never called
#[tokio::test]
async fn trigger_sync_limits_run_to_scope() -> Result<(), TestError> {
    let other_token = "secret-token:labs00000001";
    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_entity("empire-labs")
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_credential("empire-labs", other_token)
        .with_accounts_endpoint(TEST_TOKEN, vec![], 1)
        .with_accounts_endpoint(other_token, vec![], 0)
        .build()
        .await?;

    let params = SyncParams {
        entity_id: Some(format!(" {} ,", TEST_ENTITY_SLUG)),
    };
    let response = trigger_sync(State(test.into_app_state()), Query(params))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["synced"], 1);
    test.assert_mocks();

    Ok(())
}

/// Tests that the run history lists finished runs with their entity outcomes.
///
/// Expected: 200 OK with one completed run carrying one success outcome
#[tokio::test]
async fn get_sync_runs_lists_outcomes() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_entity(TEST_ENTITY_SLUG)
        .with_credential(TEST_ENTITY_SLUG, TEST_TOKEN)
        .with_accounts_endpoint(TEST_TOKEN, vec![], 1)
        .build()
        .await?;
    let state = test.into_app_state();

    state.coordinator.run_sync(None).await.unwrap();

    let result = get_sync_runs(State(state), Query(SyncRunsParams::default())).await;

    assert!(result.is_ok());
    let response = result.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let runs = body["data"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["status"], "completed");
    assert_eq!(runs[0]["trigger"], "manual");
    assert_eq!(runs[0]["outcomes"][0]["entityId"], TEST_ENTITY_SLUG);
    assert_eq!(runs[0]["outcomes"][0]["outcome"], "success");

    Ok(())
}

/// Tests that an out of range limit is rejected.
///
/// Expected: Err with 400 BAD_REQUEST naming the limit field
#[tokio::test]
async fn get_sync_runs_rejects_invalid_limit() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;

    for limit in ["0", "101", "ten"] {
        let params = SyncRunsParams {
            limit: Some(limit.to_string()),
        };
        let result = get_sync_runs(State(test.into_app_state()), Query(params)).await;

        assert!(result.is_err());
        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(error_fields(&body), vec!["limit"]);
    }

    Ok(())
}
