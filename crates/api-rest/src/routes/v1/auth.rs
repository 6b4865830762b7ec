//! Registration and login.

use crate::{
    error::{ApiResult, ErrorResponse},
    extractors::{RequestContext, ValidatedJson},
    responses::{ApiResponse, Created},
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyhub_application::{
    dto::UserDto,
    validation::{LoginRequest, RegisterRequest},
};
use tracing::info;
use utoipa::ToSchema;

/// Authentication response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
    /// The authenticated account
    #[schema(value_type = Object)]
    pub user: UserDto,
}

impl AuthResponse {
    fn issue(state: &AppState, user: UserDto) -> ApiResult<Self> {
        let issued = state.tokens.issue(user.id, user.role)?;
        Ok(Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user,
        })
    }
}

/// Authentication routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Register new user
///
/// Create an account and return an access token for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 422, description = "Invalid registration data", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    request: RequestContext,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<AuthResponse>> {
    let user = state.users.register(&request.ctx(), req).await?;
    info!(user_id = %user.id, "Account registered");

    Ok(Created(AuthResponse::issue(&state, user)?))
}

/// Log in
///
/// Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    request: RequestContext,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let user = state.users.login(&request.ctx(), req).await?;

    Ok(ApiResponse::success(AuthResponse::issue(&state, user)?))
}
