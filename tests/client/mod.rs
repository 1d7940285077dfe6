//! Tests for the rate-limited provider client against a mock provider.

mod errors;
mod rate_limit;
mod retry;

use empire::server::{
    client::{ClientConfig, MercuryClient, RetryPolicy},
    credential::AccessToken,
    error::provider::ProviderError,
};
use empire_test_utils::prelude::*;
use serde_json::json;

use crate::util::TestContextExt;
