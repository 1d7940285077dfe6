use std::time::{Duration, Instant};

use futures::future::join_all;

use super::*;

/// Tests that an exhausted token bucket suspends callers instead of failing them.
///
/// A bucket holding 2 slots and refilling 2 per second must delay 8 of 10 immediate calls
/// by a total of 4 seconds.
///
/// Expected: all 10 calls succeed after at least 4 seconds
#[tokio::test]
async fn bucket_suspends_calls_instead_of_failing() -> Result<(), TestError> {
    let test = TestBuilder::new()
        .with_accounts_endpoint(TEST_TOKEN, vec![], 10)
        .build()
        .await?;

    let mut config = ClientConfig::new(test.provider_url());
    config.bucket_capacity = 2;
    config.refill_per_sec = 2.0;
    let client = MercuryClient::new(config).unwrap();
    let token = AccessToken::new(TEST_TOKEN);

    let started = Instant::now();
    let results = join_all((0..10).map(|_| client.list_accounts(&token))).await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(Result::is_ok));
    // Refill is continuous, allow for timer granularity
    assert!(
        elapsed >= Duration::from_millis(3950),
        "10 calls finished in {elapsed:?}"
    );
    test.assert_mocks();

    Ok(())
}

/// Tests that each token is throttled by its own bucket.
///
/// Expected: a second token is served at once while the first token's bucket is empty
#[tokio::test]
async fn tokens_do_not_share_buckets() -> Result<(), TestError> {
    let other_token = "secret-token:zzz987654321";
    let test = TestBuilder::new()
        .with_accounts_endpoint(TEST_TOKEN, vec![], 1)
        .with_accounts_endpoint(other_token, vec![], 1)
        .build()
        .await?;

    let mut config = ClientConfig::new(test.provider_url());
    config.bucket_capacity = 1;
    config.refill_per_sec = 0.1;
    let client = MercuryClient::new(config).unwrap();

    let started = Instant::now();
    client.list_accounts(&AccessToken::new(TEST_TOKEN)).await.unwrap();
    client.list_accounts(&AccessToken::new(other_token)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    test.assert_mocks();

    Ok(())
}
