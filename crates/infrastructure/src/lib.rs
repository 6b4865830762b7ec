//! Infrastructure layer for StudyHub
//!
//! This crate provides implementations for:
//! - Database access (PostgreSQL with sqlx, embedded migrations)
//! - Repository adapters for the application ports, backed either by
//!   PostgreSQL JSONB documents or by an in-process document store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use studyhub_infrastructure::{DatabaseConfig, DatabasePool, Repositories};
//!
//! let pool = DatabasePool::new(&DatabaseConfig::new(url)).await?;
//! pool.migrate().await?;
//! let repos = Repositories::postgres(&pool);
//! ```
//!
//! Without a database URL, `Repositories::in_memory()` serves the same
//! ports from process memory.

pub mod database;
pub mod repositories;

pub use database::{DatabaseConfig, DatabasePool, HealthStatus, PoolStats};
pub use repositories::{
    InMemoryGroupRepository, InMemoryQuestionRepository, InMemoryUserRepository,
    PgGroupRepository, PgQuestionRepository, PgUserRepository, Repositories,
};

use studyhub_application::ApplicationError;

pub type Result<T> = std::result::Result<T, Error>;

/// PostgreSQL SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failures
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violations
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(sqlx::Error::PoolTimedOut)
                | Error::Database(sqlx::Error::Io(_))
                | Error::Database(sqlx::Error::PoolClosed)
        )
    }

    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::Configuration(_) => 400,
            Error::Serialization(_) => 500,
            Error::Database(_) | Error::Migration(_) => 503,
        }
    }

    /// Map a write failure, turning unique violations into `Conflict`.
    pub(crate) fn on_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Error::Conflict(format!("{} already exists", what))
            }
            _ => Error::Database(err),
        }
    }
}

impl From<Error> for ApplicationError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApplicationError::NotFound(msg),
            Error::Conflict(msg) => ApplicationError::Conflict(msg),
            Error::Configuration(msg) => ApplicationError::Internal(msg),
            Error::Serialization(e) => {
                tracing::error!(error = %e, "Stored document failed to decode");
                ApplicationError::Internal("Stored document is corrupt".to_string())
            }
            Error::Database(e) => {
                tracing::error!(error = %e, "Database failure");
                ApplicationError::ServiceUnavailable("Database unavailable".to_string())
            }
            Error::Migration(e) => ApplicationError::ServiceUnavailable(e.to_string()),
        }
    }
}
