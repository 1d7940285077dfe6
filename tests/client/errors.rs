use super::*;

/// Tests that a rejected call names the token only by its masked hint.
///
/// Expected: the error mentions `secret-t...` and never `secret-token:abc123456789`
#[tokio::test]
async fn client_error_masks_token() -> Result<(), TestError> {
    let mut test = TestBuilder::new().build().await?;
    let mock = test.provider().create_error_endpoint(
        "/accounts",
        401,
        json!({ "errors": { "message": "invalid token", "errorCode": "unauthorized" } }),
        1,
    );
    test.keep_mock(mock);

    let client = test.mercury_client(RetryPolicy::immediate(3));
    let err = client
        .list_accounts(&AccessToken::new(TEST_TOKEN))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::ClientRequestError { status: 401, .. }
    ));

    let display = err.to_string();
    let debug = format!("{err:?}");
    assert!(display.contains("secret-t..."), "{display}");
    assert!(!display.contains(TEST_TOKEN));
    assert!(!debug.contains(TEST_TOKEN));
    test.assert_mocks();

    Ok(())
}

/// Tests that transport failures mask the token as well.
///
/// Expected: a transient error naming only the masked hint
#[tokio::test]
async fn unreachable_provider_masks_token() -> Result<(), TestError> {
    let mut config = ClientConfig::new("http://127.0.0.1:1");
    config.retry = RetryPolicy::immediate(1);
    let client = MercuryClient::new(config).unwrap();

    let err = client
        .list_accounts(&AccessToken::new(TEST_TOKEN))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::TransientNetworkError { attempts: 1, .. }
    ));
    assert!(err.to_string().contains("secret-t..."));
    assert!(!format!("{err:?}").contains(TEST_TOKEN));

    Ok(())
}
