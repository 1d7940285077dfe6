use std::time::Duration;

use super::*;

/// Tests that 5xx responses are retried up to the attempt limit.
///
/// Expected: Err(TransientNetworkError) after exactly 3 requests
#[tokio::test]
async fn server_errors_are_retried_until_exhausted() -> Result<(), TestError> {
    let mut test = TestBuilder::new().build().await?;
    let mock = test.provider().create_error_endpoint(
        "/accounts",
        503,
        json!({ "message": "maintenance" }),
        3,
    );
    test.keep_mock(mock);

    let client = test.mercury_client(RetryPolicy::immediate(3));
    let result = client.list_accounts(&AccessToken::new(TEST_TOKEN)).await;

    assert!(matches!(
        result,
        Err(ProviderError::TransientNetworkError { attempts: 3, .. })
    ));
    test.assert_mocks();

    Ok(())
}

/// Tests that throttling is retried and surfaces the provider's retry hint.
///
/// Expected: Err(RateLimitExceeded) after exactly 3 requests, carrying the Retry-After value
#[tokio::test]
async fn throttling_is_retried_until_exhausted() -> Result<(), TestError> {
    let mut test = TestBuilder::new().build().await?;
    let mock = test
        .provider()
        .create_rate_limited_endpoint("/accounts", 0, 3);
    test.keep_mock(mock);

    let client = test.mercury_client(RetryPolicy::immediate(3));
    let result = client.list_accounts(&AccessToken::new(TEST_TOKEN)).await;

    match result {
        Err(ProviderError::RateLimitExceeded {
            attempts,
            retry_after,
            ..
        }) => {
            assert_eq!(attempts, 3);
            assert_eq!(retry_after, Some(Duration::ZERO));
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
    test.assert_mocks();

    Ok(())
}

/// Tests that client errors fail on the first attempt.
///
/// Expected: Err(ClientRequestError) after exactly 1 request
#[tokio::test]
async fn client_errors_are_not_retried() -> Result<(), TestError> {
    let mut test = TestBuilder::new().build().await?;
    let mock = test.provider().create_error_endpoint(
        "/accounts",
        400,
        json!({ "errors": { "message": "bad request", "errorCode": "invalid_params" } }),
        1,
    );
    test.keep_mock(mock);

    let client = test.mercury_client(RetryPolicy::immediate(3));
    let result = client.list_accounts(&AccessToken::new(TEST_TOKEN)).await;

    match result {
        Err(ProviderError::ClientRequestError { status, code, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("invalid_params"));
        }
        other => panic!("expected ClientRequestError, got {other:?}"),
    }
    test.assert_mocks();

    Ok(())
}

/// Tests that a malformed body fails without retrying.
///
/// Expected: Err(InvalidResponse) after exactly 1 request
#[tokio::test]
async fn malformed_body_is_not_retried() -> Result<(), TestError> {
    let mut test = TestBuilder::new().build().await?;
    let mock = test
        .provider()
        .create_json_endpoint("/accounts", json!({ "accounts": "none" }), 1);
    test.keep_mock(mock);

    let client = test.mercury_client(RetryPolicy::immediate(3));
    let result = client.list_accounts(&AccessToken::new(TEST_TOKEN)).await;

    assert!(matches!(result, Err(ProviderError::InvalidResponse { .. })));
    test.assert_mocks();

    Ok(())
}
