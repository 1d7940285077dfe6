//! Error types for the Empire sync server.
//!
//! Domain errors are grouped by the layer that raises them (configuration, the banking
//! provider, the sync engine, the reconciliation store and request validation) and
//! aggregated into [`Error`]. All variants derive their `Display` via `thiserror`, and
//! [`Error`] implements `IntoResponse` so controllers can return it directly.

pub mod config;
pub mod provider;
pub mod retry;
pub mod store;
pub mod sync;
pub mod validation;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    model::api::ApiResponse,
    server::error::{
        config::ConfigError, provider::ProviderError, store::StoreError, sync::SyncError,
        validation::ValidationError,
    },
};

/// Main error type for the Empire sync server.
///
/// Wraps every domain specific error plus the external library errors the server can
/// encounter, with `#[from]` conversions so `?` works across layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables, entities file).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Banking provider error (client errors, throttling, network, malformed payloads).
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    /// Sync engine error (missing credentials, entity timeouts).
    #[error(transparent)]
    SyncError(#[from] SyncError),
    /// Reconciliation store rejected a write.
    #[error(transparent)]
    StoreError(#[from] StoreError),
    /// Request parameters failed validation.
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    /// Failed to parse or compute a value.
    #[error("Failed to parse value: {0:?}")]
    ParseError(String),
    /// Internal error indicating a bug in the sync engine.
    #[error("Internal error: {0}")]
    InternalError(String),
    /// Database error (query failures, connection issues, constraint violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// I/O error (binding the listener).
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// HTTP client construction error.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    /// Cron scheduler error (job registration, scheduler startup).
    #[error(transparent)]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Converts application errors into HTTP responses.
///
/// Validation failures become a 400 with field level detail; every other error is
/// logged in full and surfaced as a generic 500 so provider context and masked token
/// hints never reach API consumers.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationError(err) => err.into_response(),
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper type for converting any displayable error into a 500 Internal Server Error response.
///
/// Logs the error message and returns a generic message in the standard failure envelope.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(
                "INTERNAL_ERROR",
                "Internal server error",
            )),
        )
            .into_response()
    }
}
