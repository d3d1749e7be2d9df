//! Unified error handling for the call statistics dashboard
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    // ==================== Boundary Errors ====================
    #[error("Boundary connection error: {0}")]
    BoundaryConnection(String),

    #[error("Boundary request timed out after {0}ms")]
    BoundaryTimeout(u64),

    #[error("Boundary returned HTTP {status}: {path}")]
    BoundaryStatus { status: u16, path: String },

    #[error("Boundary response could not be decoded: {0}")]
    BoundaryDecode(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid bucket layout: {0}")]
    InvalidBuckets(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::InvalidBuckets(_) => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            AppError::NotFound(_) | AppError::UnknownSource(_) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway
            AppError::BoundaryConnection(_)
            | AppError::BoundaryStatus { .. }
            | AppError::BoundaryDecode(_) => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::BoundaryTimeout(_) => StatusCode::GATEWAY_TIMEOUT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BoundaryConnection(_) => "boundary_connection_error",
            AppError::BoundaryTimeout(_) => "boundary_timeout",
            AppError::BoundaryStatus { .. } => "boundary_status_error",
            AppError::BoundaryDecode(_) => "boundary_decode_error",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidBuckets(_) => "invalid_buckets",
            AppError::NotFound(_) => "not_found",
            AppError::UnknownSource(_) => "unknown_source",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether a failed acquisition is worth a second attempt.
    ///
    /// Transport failures, timeouts and 5xx responses are transient; 4xx and
    /// decode failures will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::BoundaryConnection(_) | AppError::BoundaryTimeout(_) => true,
            AppError::BoundaryStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
