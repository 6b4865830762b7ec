//! Pagination extractor.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use studyhub_common::PaginationParams;

/// Query parameters for pagination
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Extracted pagination parameters
///
/// Out-of-range values are clamped rather than rejected: page 0 becomes 1
/// and `per_page` is held to the maximum page size.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Pagination parameters
    pub params: PaginationParams,
}

impl Pagination {
    /// Get offset for database queries
    pub fn offset(&self) -> u64 {
        self.params.offset()
    }

    /// Get limit for database queries
    pub fn limit(&self) -> u32 {
        self.params.limit()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid pagination parameters: {}", e)))?;

        let params = PaginationParams::new(query.page, query.per_page);
        params
            .validate()
            .map_err(|e| ApiError::BadRequest(format!("Invalid pagination: {}", e)))?;

        Ok(Self { params })
    }
}
