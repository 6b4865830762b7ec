//! Account endpoints for the signed-in user and public profiles.

use crate::{
    error::{ApiResult, ErrorResponse},
    extractors::{AuthenticatedUser, PathParams, ValidatedJson},
    responses::{ApiResponse, NoContent},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use studyhub_application::{
    dto::{PublicUserDto, UserDto},
    validation::{ChangePasswordRequest, UpdateProfileRequest},
};
use studyhub_domain::UserId;

/// User routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(get_current_user)
                .patch(update_profile)
                .delete(delete_account),
        )
        .route("/users/me/password", put(change_password))
        .route("/users/:id", get(get_user))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The signed-in account"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<ApiResponse<UserDto>> {
    Ok(ApiResponse::success(state.users.me(&user.ctx()).await?))
}

/// Update profile
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated"),
        (status = 422, description = "Invalid display name", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<UserDto>> {
    Ok(ApiResponse::success(
        state.users.update_profile(&user.ctx(), req).await?,
    ))
}

/// Change password
#[utoipa::path(
    put,
    path = "/api/v1/users/me/password",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 422, description = "New password too weak", body = ErrorResponse),
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<NoContent> {
    state.users.change_password(&user.ctx(), req).await?;
    Ok(NoContent)
}

/// Delete account
///
/// Refused while the caller still owns a group.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 409, description = "Caller still owns groups", body = ErrorResponse),
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<NoContent> {
    state.users.delete_account(&user.ctx()).await?;
    Ok(NoContent)
}

/// Public profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "Public profile"),
        (status = 404, description = "No such user", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<UserId>,
) -> ApiResult<ApiResponse<PublicUserDto>> {
    Ok(ApiResponse::success(state.users.get_user(&user.ctx(), id).await?))
}
