use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::{ApiResponse, FieldErrorDto};

/// One or more request parameters were rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid request parameters: {}", describe(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldErrorDto>,
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldErrorDto {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }
}

fn describe(errors: &[FieldErrorDto]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::invalid(self.errors)),
        )
            .into_response()
    }
}
