//! Application builder.
//!
//! Assembles routes, middleware and state into an Axum router, and owns
//! the OpenAPI document served at `/api-docs/openapi.json`.

use crate::{
    error::ErrorResponse,
    middleware::{logging_middleware, request_id_middleware, RateLimitLayer, REQUEST_ID_HEADER},
    responses::PaginationMeta,
    routes::{self, health, v1},
    state::AppState,
};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

/// Create the main application router
pub fn create_app(state: AppState) -> anyhow::Result<Router> {
    let config = state.config.clone();
    let cors = build_cors_layer(&config.server.cors_origins)?;
    let rate_limit =
        RateLimitLayer::from_policy(config.rate_limit.enabled, config.rate_limit.general);

    let app = Router::new()
        .merge(routes::health_routes())
        .nest("/api/v1", v1::routes(&config.rate_limit))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors)
                // Outside the limiter so rejections carry a request id and get logged
                .layer(middleware::from_fn(request_id_middleware))
                .layer(middleware::from_fn(logging_middleware))
                .layer(rate_limit)
                .layer(TimeoutLayer::new(config.request_timeout())),
        );

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the CORS layer; no configured origins (or `*`) allows any origin
fn build_cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            RETRY_AFTER,
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let allowed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(allowed)))
}

/// OpenAPI document for the public API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyHub API",
        version = "1.0.0",
        description = "REST API for study groups practising coding interview questions",
        license(name = "MIT"),
    ),
    paths(
        health::health,
        health::ready,
        v1::auth::register,
        v1::auth::login,
        v1::users::get_current_user,
        v1::users::update_profile,
        v1::users::change_password,
        v1::users::delete_account,
        v1::users::get_user,
        v1::groups::list_groups,
        v1::groups::create_group,
        v1::groups::join_group,
        v1::groups::get_group,
        v1::groups::update_group,
        v1::groups::delete_group,
        v1::groups::leave_group,
        v1::groups::regenerate_invite_code,
        v1::groups::transfer_ownership,
        v1::groups::list_members,
        v1::groups::remove_member,
        v1::groups::set_member_role,
        v1::questions::list_questions,
        v1::questions::create_question,
        v1::questions::get_question,
        v1::questions::update_question,
        v1::questions::delete_question,
        v1::questions::list_responses,
        v1::questions::upsert_response,
        v1::questions::delete_response,
        v1::questions::rate_difficulty,
        v1::questions::list_feedback,
        v1::questions::add_feedback,
        v1::questions::update_feedback,
        v1::questions::delete_feedback,
        v1::stats::my_stats,
        v1::stats::group_stats,
        v1::stats::group_leaderboard,
        v1::stats::group_activity,
        v1::stats::member_stats,
        v1::stats::question_stats,
    ),
    components(schemas(
        ErrorResponse,
        PaginationMeta,
        health::HealthResponse,
        health::ReadinessResponse,
        health::ReadinessChecks,
        v1::auth::AuthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Accounts and profiles"),
        (name = "groups", description = "Study groups and membership"),
        (name = "questions", description = "Questions, responses, ratings and feedback"),
        (name = "stats", description = "Progress statistics and leaderboards"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
