//! Unified error handling for the checkout backend
//!
//! This module provides the application error taxonomy with proper HTTP status
//! mapping and user-friendly messages. The wire format is produced by
//! `middleware::error`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failed field in a validation error.
///
/// Validation collects every failing field before responding, so clients can
/// show all problems at once instead of fixing them one request at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Client-correctable input problems. Always 400 with an itemized list.
    Validation { details: Vec<FieldError> },
    /// A required query parameter was absent. 400.
    MissingParam { param: String },
    /// Payment or mail transport failure. 500 with a generic user-facing
    /// message; the detail goes to the server log only.
    UpstreamProvider { service: String, message: String },
    /// Missing or invalid required secret/credential. 500 with an explicit
    /// diagnostic so operators can tell it apart from a transient failure.
    Configuration { message: String },
}

impl AppError {
    pub fn validation(details: Vec<FieldError>) -> Self {
        AppError::Validation { details }
    }

    pub fn missing_param(param: impl Into<String>) -> Self {
        AppError::MissingParam {
            param: param.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::UpstreamProvider {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
        }
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::MissingParam { .. } => 400,
            AppError::UpstreamProvider { .. } => 500,
            AppError::Configuration { .. } => 500,
        }
    }

    /// Get user-facing error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { .. } => "Invalid order data".to_string(),
            AppError::MissingParam { param } => format!("Missing required parameter: {}", param),
            AppError::UpstreamProvider { service, .. } => {
                format!("{} request failed. Please try again later", service)
            }
            AppError::Configuration { message } => {
                format!("Server configuration error: {}", message)
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for AppError {}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::configuration(err.to_string())
    }
}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
