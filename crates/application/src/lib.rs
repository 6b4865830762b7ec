//! Application layer for StudyHub
//!
//! This crate orchestrates domain logic and coordinates between layers.
//!
//! ## Modules
//!
//! - `services` - Use cases (UserService, GroupService, QuestionService, StatsService)
//! - `stats` - Member-response aggregation and statistics engine
//! - `validation` - Request types and the input validation framework
//! - `dto` - Views returned to the API layer

pub mod dto;
pub mod services;
pub mod stats;
pub mod validation;

// Re-export commonly used types
pub use services::{
    AuthorizationResult, EventPublisher, NoOpEventPublisher, ServiceConfig, ServiceContext,
    ServiceEvent, TracingEventPublisher,
};
pub use stats::{StatsConfig, StatsEngine};
pub use validation::{Validatable, ValidationResult, ValidationRules};

use studyhub_domain::errors::{AppError, AuthorizationError, GroupError, QuestionError};
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug, Clone)]
pub enum ApplicationError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Resource conflict (e.g., duplicate)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Backing store unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApplicationError {
    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            ApplicationError::NotFound(_) => 404,
            ApplicationError::Unauthorized(_) => 401,
            ApplicationError::Forbidden(_) => 403,
            ApplicationError::ValidationFailed(_) => 422,
            ApplicationError::Conflict(_) => 409,
            ApplicationError::Internal(_) => 500,
            ApplicationError::ServiceUnavailable(_) => 503,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplicationError::ServiceUnavailable(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApplicationError::NotFound(_) => "NOT_FOUND",
            ApplicationError::Unauthorized(_) => "UNAUTHORIZED",
            ApplicationError::Forbidden(_) => "FORBIDDEN",
            ApplicationError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApplicationError::Conflict(_) => "CONFLICT",
            ApplicationError::Internal(_) => "INTERNAL_ERROR",
            ApplicationError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl From<AppError> for ApplicationError {
    fn from(err: AppError) -> Self {
        let message = match &err {
            AppError::Group(e) => e.to_string(),
            AppError::Question(e) => e.to_string(),
            AppError::Authorization(e) => e.to_string(),
        };

        match err.http_status() {
            401 => ApplicationError::Unauthorized(message),
            403 => ApplicationError::Forbidden(message),
            404 => ApplicationError::NotFound(message),
            409 => ApplicationError::Conflict(message),
            422 => ApplicationError::ValidationFailed(message),
            _ => ApplicationError::Internal(message),
        }
    }
}

impl From<GroupError> for ApplicationError {
    fn from(err: GroupError) -> Self {
        AppError::from(err).into()
    }
}

impl From<QuestionError> for ApplicationError {
    fn from(err: QuestionError) -> Self {
        AppError::from(err).into()
    }
}

impl From<AuthorizationError> for ApplicationError {
    fn from(err: AuthorizationError) -> Self {
        AppError::from(err).into()
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
