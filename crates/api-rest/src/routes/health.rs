//! Health check endpoints.

use crate::{responses::ApiResponse, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Service uptime in seconds
    pub uptime: u64,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Individual component checks
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessChecks {
    /// Backing store: `postgres` or `memory`
    pub store: String,

    /// Store connectivity
    pub database: bool,

    /// Round-trip of the connectivity probe in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// Probe failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

/// Basic health check
///
/// Returns service status and version information.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.started_at.elapsed().as_secs(),
    };

    Json(ApiResponse::success(response))
}

/// Readiness check
///
/// Pings the database when one is configured. The in-memory store is
/// always ready.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "A dependency is unavailable", body = ReadinessResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> Response {
    let checks = match &state.database {
        Some(pool) => {
            let health = pool.health_check().await;
            ReadinessChecks {
                store: "postgres".to_string(),
                database: health.healthy,
                latency_ms: Some(health.latency.as_millis() as u64),
                error: health.error,
            }
        }
        None => ReadinessChecks {
            store: "memory".to_string(),
            database: true,
            latency_ms: None,
            error: None,
        },
    };

    let ready = checks.database;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(ReadinessResponse { ready, checks })),
    )
        .into_response()
}
