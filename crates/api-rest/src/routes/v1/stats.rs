//! Statistics endpoints.

use crate::{
    error::{ApiResult, ErrorResponse},
    extractors::{AuthenticatedUser, PathParams, QueryParams},
    responses::ApiResponse,
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use serde::Deserialize;
use studyhub_application::stats::{
    ActivityPoint, GroupOverview, LeaderboardEntry, MemberStats, QuestionStats, UserStats,
};
use studyhub_domain::{GroupId, QuestionId, UserId};

/// Query for the activity series
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Trailing days to cover
    pub days: Option<u32>,
}

/// Statistics routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me/stats", get(my_stats))
        .route("/groups/:id/stats", get(group_stats))
        .route("/groups/:id/leaderboard", get(group_leaderboard))
        .route("/groups/:id/activity", get(group_activity))
        .route("/groups/:id/members/:user_id/stats", get(member_stats))
        .route("/questions/:id/stats", get(question_stats))
}

/// My stats
///
/// Totals across every group the caller belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/stats",
    tag = "stats",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Personal statistics"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn my_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<ApiResponse<UserStats>> {
    Ok(ApiResponse::success(state.stats.my_stats(&user.ctx()).await?))
}

/// Group overview
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/stats",
    tag = "stats",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "Group totals, difficulty breakdown and highlights"),
        (status = 403, description = "Not a member", body = ErrorResponse),
    )
)]
pub async fn group_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<ApiResponse<GroupOverview>> {
    Ok(ApiResponse::success(
        state.stats.group_stats(&user.ctx(), id).await?,
    ))
}

/// Leaderboard
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/leaderboard",
    tag = "stats",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "Members ranked by solved questions"),
        (status = 403, description = "Not a member", body = ErrorResponse),
    )
)]
pub async fn group_leaderboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<ApiResponse<Vec<LeaderboardEntry>>> {
    Ok(ApiResponse::success(
        state.stats.group_leaderboard(&user.ctx(), id).await?,
    ))
}

/// Daily activity
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/activity",
    tag = "stats",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Group ID (UUID)"),
        ("days" = Option<u32>, Query, description = "Days to cover, 1 to 365 (default 30)"),
    ),
    responses(
        (status = 200, description = "One point per UTC day, oldest first"),
        (status = 403, description = "Not a member", body = ErrorResponse),
    )
)]
pub async fn group_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
    QueryParams(query): QueryParams<ActivityQuery>,
) -> ApiResult<ApiResponse<Vec<ActivityPoint>>> {
    Ok(ApiResponse::success(
        state
            .stats
            .group_activity(&user.ctx(), id, query.days)
            .await?,
    ))
}

/// Member stats
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/members/{user_id}/stats",
    tag = "stats",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Group ID (UUID)"),
        ("user_id" = String, Path, description = "Member's user ID (UUID)"),
    ),
    responses(
        (status = 200, description = "The member's aggregates in this group"),
        (status = 404, description = "Not a member of the group", body = ErrorResponse),
    )
)]
pub async fn member_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams((id, member_id)): PathParams<(GroupId, UserId)>,
) -> ApiResult<ApiResponse<MemberStats>> {
    Ok(ApiResponse::success(
        state.stats.member_stats(&user.ctx(), id, member_id).await?,
    ))
}

/// Question stats
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/stats",
    tag = "stats",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Solve rate, timing and rating aggregates"),
        (status = 404, description = "No such question", body = ErrorResponse),
    )
)]
pub async fn question_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<ApiResponse<QuestionStats>> {
    Ok(ApiResponse::success(
        state.stats.question_stats(&user.ctx(), id).await?,
    ))
}
