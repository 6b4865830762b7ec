//! HTTP error handling and conversion.
//!
//! This module provides the error type for the REST API and implements
//! conversion from application errors to HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use studyhub_application::{ApplicationError, ValidationResult};
use thiserror::Error;
use utoipa::ToSchema;

/// API-specific error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Application layer error
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Invalid or expired access token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Request body or parameters failed validation
    #[error("Validation failed")]
    Validation(ValidationResult),

    /// Malformed JSON, path or query
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found
    #[error("Resource not found")]
    NotFound,

    /// Internal server error
    #[error("Internal server error")]
    Internal(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry in {retry_after_seconds} seconds")]
    RateLimitExceeded {
        /// Seconds until the oldest counted request leaves the window
        retry_after_seconds: u64,
    },

    /// Service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Application(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Unauthorized | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Application(err) => err.error_code(),
            Self::Unauthorized | Self::InvalidToken(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message shown to clients. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Application(ApplicationError::Internal(_)) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
            Self::Validation(result) => result
                .to_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(result) => serde_json::to_value(&result.field_errors).ok(),
            _ => None,
        }
    }
}

/// Standardized error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add request ID to the error response
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The cause of a server-side error, kept on the response for logging
#[derive(Debug, Clone)]
pub struct ErrorCause(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut body = ErrorResponse::new(self.error_code(), self.public_message());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }

        let mut response = (status, Json(body.clone())).into_response();

        // The request ID middleware re-renders the body with the request ID
        response.extensions_mut().insert(body);
        if status.is_server_error() {
            response.extensions_mut().insert(ErrorCause(self.to_string()));
        }
        if let Self::RateLimitExceeded {
            retry_after_seconds,
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_seconds));
        }

        response
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        Self::Validation(result)
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
