//! Error response formatting
//!
//! Converts `AppError` values into the JSON error shapes of the HTTP surface:
//! validation failures carry an itemized `details` array, server-side failures
//! carry a single diagnostic string.

use crate::error::{AppError, FieldError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Itemized validation failures (400) or a diagnostic string (500)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        let details = match error {
            AppError::Validation { details } => serde_json::to_value(details).ok(),
            AppError::MissingParam { .. } => None,
            AppError::UpstreamProvider { service, .. } => {
                Some(serde_json::Value::String(format!("{} unavailable", service)))
            }
            AppError::Configuration { message } => {
                Some(serde_json::Value::String(message.clone()))
            }
        };

        Self {
            error: error.user_message(),
            details,
        }
    }

    /// Decode the itemized field list out of a validation response.
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.details
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = ?self,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let error_response = ErrorResponse::from_app_error(&self);
        (status_code, Json(error_response)).into_response()
    }
}
