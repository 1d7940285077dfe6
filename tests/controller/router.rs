//! Requests through the full router, covering query extraction and the OpenAPI document.

use axum::{body::Body, http::Request};
use empire::server::router::routes;
use tower::ServiceExt;

use super::*;

/// Tests that query strings reach the handlers with their camelCase names.
///
/// Expected: 400 BAD_REQUEST naming the limit field
#[tokio::test]
async fn routes_transaction_query() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let app = routes().with_state(test.into_app_state());

    let request = Request::builder()
        .uri("/api/transactions?entityId=empire-holdings&limit=0")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(error_fields(&body), vec!["limit"]);

    Ok(())
}

/// Tests that the sync endpoint only accepts POST.
///
/// Expected: 405 METHOD_NOT_ALLOWED for GET /api/sync
#[tokio::test]
async fn sync_requires_post() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let app = routes().with_state(test.into_app_state());

    let request = Request::builder()
        .uri("/api/sync")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

/// Tests that the OpenAPI document lists every endpoint.
///
/// Expected: 200 OK with the four API paths
#[tokio::test]
async fn serves_openapi_document() -> Result<(), TestError> {
    let test = TestBuilder::new().build().await?;
    let app = routes().with_state(test.into_app_state());

    let request = Request::builder()
        .uri("/api/docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    for path in ["/api/sync", "/api/sync/runs", "/api/balances", "/api/transactions"] {
        assert!(body["paths"].get(path).is_some(), "missing {path}");
    }

    Ok(())
}
