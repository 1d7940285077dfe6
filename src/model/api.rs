use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope wrapping every API response
///
/// Exactly one of `data` and `error` is present, matching `success`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                message: message.into(),
                code: code.to_string(),
                details: None,
            }),
        }
    }

    pub fn invalid(details: Vec<FieldErrorDto>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                message: "Invalid request parameters".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                details: Some(details),
            }),
        }
    }
}

/// The error returned when an API request fails
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable error message
    pub message: String,
    /// Stable machine readable error code
    pub code: String,
    /// Field level validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldErrorDto>>,
}

/// A single rejected query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}
