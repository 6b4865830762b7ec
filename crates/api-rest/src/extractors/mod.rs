//! Custom Axum extractors.
//!
//! This module provides reusable extractors for common patterns
//! like authentication, pagination, and validated JSON payloads.
//! Their rejections are [`ApiError`](crate::error::ApiError)s so every
//! failure uses the same JSON error body.

pub mod auth;
pub mod pagination;
pub mod params;
pub mod validated_json;

pub use auth::{AuthenticatedUser, RequestContext};
pub use pagination::Pagination;
pub use params::{PathParams, QueryParams};
pub use validated_json::ValidatedJson;
