//! Tests for HTTP controller endpoints.
//!
//! Handlers are called directly with their extractors. Response bodies are decoded as JSON to
//! check the `{ success, data | error }` envelope.

mod balance;
mod router;
mod sync;
mod transaction;

use axum::{
    body::to_bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use empire_test_utils::prelude::*;
use serde_json::Value;

use crate::util::TestContextExt;

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Field names reported by a validation failure, in order.
fn error_fields(body: &Value) -> Vec<String> {
    body["error"]["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
