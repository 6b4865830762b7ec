//! Common utilities and shared functionality for the StudyHub platform.
//!
//! This crate provides foundational utilities used across all services including:
//! - Configuration management
//! - Telemetry and structured logging
//! - Pagination helpers
//! - Password hashing and invite codes
//! - UTC day arithmetic
//! - Input validation

pub mod config;
pub mod crypto;
pub mod datetime;
pub mod pagination;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, RateLimitConfig, RateLimitPolicy, StatsSettings};
pub use crypto::{generate_invite_code, hash_password, verify_password};
pub use datetime::{now_utc, utc_day};
pub use pagination::{PaginatedResult, PaginationParams};
pub use telemetry::init_tracing;
pub use validation::{validate_email, validate_password, validate_url, validate_username};

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
