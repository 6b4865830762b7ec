//! API v1 routes.

use crate::{middleware::RateLimitLayer, state::AppState};
use axum::Router;
use studyhub_common::config::RateLimitConfig;

pub mod auth;
pub mod groups;
pub mod questions;
pub mod stats;
pub mod users;

/// Create all v1 API routes
///
/// The `/auth` routes carry the stricter auth rate limit on top of the
/// general one applied to the whole app.
pub fn routes(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let auth_limit = RateLimitLayer::from_policy(rate_limit.enabled, rate_limit.auth);

    Router::new()
        .merge(auth::routes().route_layer(auth_limit))
        .merge(users::routes())
        .merge(groups::routes())
        .merge(questions::routes())
        .merge(stats::routes())
}
