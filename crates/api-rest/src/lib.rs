//! StudyHub REST API
//!
//! This crate provides the Axum-based HTTP surface for StudyHub: account
//! and token handling, groups and membership, questions with their member
//! responses, and the statistics endpoints.
//!
//! ## Architecture
//!
//! The API is organized into the following modules:
//!
//! - **app**: Router assembly, middleware stack and the OpenAPI document
//! - **auth**: Access token issuing and verification
//! - **routes**: HTTP route handlers organized by resource
//! - **middleware**: Request ID, logging, error envelopes and rate limiting
//! - **extractors**: Custom Axum extractors for common patterns
//! - **responses**: Standardized response types
//! - **error**: HTTP error handling and conversion
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studyhub_api_rest::{create_app, AppState};
//! use studyhub_common::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = AppState::in_memory(AppConfig::development());
//!     let app = create_app(state)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use app::create_app;
pub use auth::{Claims, TokenService};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
