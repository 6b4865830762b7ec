//! Group and membership endpoints.

use crate::{
    error::{ApiResult, ErrorResponse},
    extractors::{AuthenticatedUser, Pagination, PathParams, ValidatedJson},
    responses::{ApiResponse, Created, NoContent, PaginatedResponse},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};
use studyhub_application::{
    dto::{GroupDto, InviteCodeDto, MemberDto},
    validation::{
        CreateGroupRequest, JoinGroupRequest, SetMemberRoleRequest, TransferOwnershipRequest,
        UpdateGroupRequest,
    },
};
use studyhub_domain::{GroupId, UserId};

/// Group routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/join", post(join_group))
        .route(
            "/groups/:id",
            get(get_group).patch(update_group).delete(delete_group),
        )
        .route("/groups/:id/leave", post(leave_group))
        .route("/groups/:id/invite-code", post(regenerate_invite_code))
        .route("/groups/:id/transfer", post(transfer_ownership))
        .route("/groups/:id/members", get(list_members))
        .route("/groups/:id/members/:user_id", delete(remove_member))
        .route("/groups/:id/members/:user_id/role", put(set_member_role))
}

/// List my groups
///
/// Groups the caller belongs to, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    security(("bearer" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("per_page" = Option<u32>, Query, description = "Items per page (max 100)"),
    ),
    responses((status = 200, description = "Paginated groups"))
)]
pub async fn list_groups(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    pagination: Pagination,
) -> ApiResult<PaginatedResponse<GroupDto>> {
    let page = state
        .groups
        .list_my_groups(&user.ctx(), pagination.params)
        .await?;
    Ok(page.into())
}

/// Create group
///
/// The caller becomes the owner.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "groups",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Group created"),
        (status = 422, description = "Invalid group data", body = ErrorResponse),
    )
)]
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<GroupDto>> {
    Ok(Created(state.groups.create_group(&user.ctx(), req).await?))
}

/// Join by invite code
#[utoipa::path(
    post,
    path = "/api/v1/groups/join",
    tag = "groups",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Joined"),
        (status = 404, description = "Unknown invite code", body = ErrorResponse),
        (status = 409, description = "Already a member or group full", body = ErrorResponse),
    )
)]
pub async fn join_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<JoinGroupRequest>,
) -> ApiResult<ApiResponse<GroupDto>> {
    Ok(ApiResponse::success(
        state.groups.join_group(&user.ctx(), req).await?,
    ))
}

/// Get group
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "Group details; the invite code is shown to admins only"),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "No such group", body = ErrorResponse),
    )
)]
pub async fn get_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<ApiResponse<GroupDto>> {
    Ok(ApiResponse::success(
        state.groups.get_group(&user.ctx(), id).await?,
    ))
}

/// Update group
#[utoipa::path(
    patch,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "Group updated"),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn update_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
    ValidatedJson(req): ValidatedJson<UpdateGroupRequest>,
) -> ApiResult<ApiResponse<GroupDto>> {
    Ok(ApiResponse::success(
        state.groups.update_group(&user.ctx(), id, req).await?,
    ))
}

/// Delete group
///
/// Owner only. The group's questions are deleted with it.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
    )
)]
pub async fn delete_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<NoContent> {
    state.groups.delete_group(&user.ctx(), id).await?;
    Ok(NoContent)
}

/// Leave group
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/leave",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 204, description = "Left the group"),
        (status = 403, description = "The owner cannot leave", body = ErrorResponse),
    )
)]
pub async fn leave_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<NoContent> {
    state.groups.leave_group(&user.ctx(), id).await?;
    Ok(NoContent)
}

/// Regenerate invite code
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/invite-code",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "New invite code"),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn regenerate_invite_code(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<ApiResponse<InviteCodeDto>> {
    let code = state.groups.regenerate_invite_code(&user.ctx(), id).await?;
    Ok(ApiResponse::success_with_message(
        code,
        "The previous invite code no longer works",
    ))
}

/// Transfer ownership
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/transfer",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 200, description = "Ownership transferred; the previous owner becomes an admin"),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Target is not a member", body = ErrorResponse),
    )
)]
pub async fn transfer_ownership(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
    ValidatedJson(req): ValidatedJson<TransferOwnershipRequest>,
) -> ApiResult<ApiResponse<GroupDto>> {
    Ok(ApiResponse::success(
        state.groups.transfer_ownership(&user.ctx(), id, req).await?,
    ))
}

/// List members
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/members",
    tag = "groups",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses((status = 200, description = "Members with their roles"))
)]
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<GroupId>,
) -> ApiResult<ApiResponse<Vec<MemberDto>>> {
    Ok(ApiResponse::success(
        state.groups.list_members(&user.ctx(), id).await?,
    ))
}

/// Remove member
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{user_id}",
    tag = "groups",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Group ID (UUID)"),
        ("user_id" = String, Path, description = "Member's user ID (UUID)"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
    )
)]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams((id, member_id)): PathParams<(GroupId, UserId)>,
) -> ApiResult<NoContent> {
    state
        .groups
        .remove_member(&user.ctx(), id, member_id)
        .await?;
    Ok(NoContent)
}

/// Set member role
#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}/members/{user_id}/role",
    tag = "groups",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Group ID (UUID)"),
        ("user_id" = String, Path, description = "Member's user ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Role updated"),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 422, description = "Owner role cannot be assigned here", body = ErrorResponse),
    )
)]
pub async fn set_member_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams((id, member_id)): PathParams<(GroupId, UserId)>,
    ValidatedJson(req): ValidatedJson<SetMemberRoleRequest>,
) -> ApiResult<ApiResponse<MemberDto>> {
    Ok(ApiResponse::success(
        state
            .groups
            .set_member_role(&user.ctx(), id, member_id, req)
            .await?,
    ))
}
