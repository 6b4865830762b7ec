//! Question, response, rating and feedback endpoints.

use crate::{
    error::{ApiResult, ErrorResponse},
    extractors::{AuthenticatedUser, Pagination, PathParams, QueryParams, ValidatedJson},
    responses::{ApiResponse, Created, NoContent, PaginatedResponse},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, patch, put},
    Router,
};
use studyhub_application::{
    dto::{FeedbackDto, QuestionDto, ResponseDto},
    validation::{
        CreateQuestionRequest, FeedbackRequest, QuestionFilters, RateDifficultyRequest,
        UpdateQuestionRequest, UpsertResponseRequest,
    },
};
use studyhub_domain::{FeedbackId, GroupId, QuestionId};

/// Question routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/groups/:id/questions",
            get(list_questions).post(create_question),
        )
        .route(
            "/questions/:id",
            get(get_question)
                .patch(update_question)
                .delete(delete_question),
        )
        .route(
            "/questions/:id/responses",
            get(list_responses)
                .put(upsert_response)
                .delete(delete_response),
        )
        .route("/questions/:id/rating", put(rate_difficulty))
        .route(
            "/questions/:id/feedback",
            get(list_feedback).post(add_feedback),
        )
        .route(
            "/questions/:id/feedback/:feedback_id",
            patch(update_feedback).delete(delete_feedback),
        )
}

/// List questions
///
/// A group's questions, newest first, with optional filters.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/questions",
    tag = "questions",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Group ID (UUID)"),
        ("difficulty" = Option<String>, Query, description = "easy, medium or hard"),
        ("platform" = Option<String>, Query, description = "leetcode, hackerrank, codeforces, codewars or other"),
        ("tag" = Option<String>, Query, description = "Exact tag, case-insensitive"),
        ("search" = Option<String>, Query, description = "Substring of the title, case-insensitive"),
        ("page" = Option<u32>, Query, description = "Page number (1-indexed)"),
        ("per_page" = Option<u32>, Query, description = "Items per page (max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated questions"),
        (status = 403, description = "Not a member", body = ErrorResponse),
    )
)]
pub async fn list_questions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(group_id): PathParams<GroupId>,
    QueryParams(filters): QueryParams<QuestionFilters>,
    pagination: Pagination,
) -> ApiResult<PaginatedResponse<QuestionDto>> {
    let page = state
        .questions
        .list_questions(&user.ctx(), group_id, filters, pagination.params)
        .await?;
    Ok(page.into())
}

/// Post question
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/questions",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Group ID (UUID)")),
    responses(
        (status = 201, description = "Question posted"),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 422, description = "Invalid question", body = ErrorResponse),
    )
)]
pub async fn create_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(group_id): PathParams<GroupId>,
    ValidatedJson(req): ValidatedJson<CreateQuestionRequest>,
) -> ApiResult<Created<QuestionDto>> {
    Ok(Created(
        state
            .questions
            .create_question(&user.ctx(), group_id, req)
            .await?,
    ))
}

/// Get question
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Question with aggregate counts and the caller's own status"),
        (status = 404, description = "No such question", body = ErrorResponse),
    )
)]
pub async fn get_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<ApiResponse<QuestionDto>> {
    Ok(ApiResponse::success(
        state.questions.get_question(&user.ctx(), id).await?,
    ))
}

/// Update question
///
/// Author or group admin.
#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Question updated"),
        (status = 403, description = "Not the author or an admin", body = ErrorResponse),
    )
)]
pub async fn update_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
    ValidatedJson(req): ValidatedJson<UpdateQuestionRequest>,
) -> ApiResult<ApiResponse<QuestionDto>> {
    Ok(ApiResponse::success(
        state.questions.update_question(&user.ctx(), id, req).await?,
    ))
}

/// Delete question
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 403, description = "Not the author or an admin", body = ErrorResponse),
    )
)]
pub async fn delete_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<NoContent> {
    state.questions.delete_question(&user.ctx(), id).await?;
    Ok(NoContent)
}

/// List responses
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/responses",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses((status = 200, description = "Every member's response"))
)]
pub async fn list_responses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<ApiResponse<Vec<ResponseDto>>> {
    Ok(ApiResponse::success(
        state.questions.list_responses(&user.ctx(), id).await?,
    ))
}

/// Record my response
///
/// Creates or replaces the caller's response.
#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}/responses",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Response recorded"),
        (status = 422, description = "Invalid response", body = ErrorResponse),
    )
)]
pub async fn upsert_response(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
    ValidatedJson(req): ValidatedJson<UpsertResponseRequest>,
) -> ApiResult<ApiResponse<ResponseDto>> {
    Ok(ApiResponse::success(
        state.questions.upsert_response(&user.ctx(), id, req).await?,
    ))
}

/// Delete my response
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}/responses",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 204, description = "Response removed"),
        (status = 404, description = "No response to remove", body = ErrorResponse),
    )
)]
pub async fn delete_response(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<NoContent> {
    state.questions.delete_response(&user.ctx(), id).await?;
    Ok(NoContent)
}

/// Rate difficulty
#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}/rating",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Rating recorded; returns the updated question"),
        (status = 422, description = "Rating outside 1-5", body = ErrorResponse),
    )
)]
pub async fn rate_difficulty(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
    ValidatedJson(req): ValidatedJson<RateDifficultyRequest>,
) -> ApiResult<ApiResponse<QuestionDto>> {
    Ok(ApiResponse::success(
        state.questions.rate_difficulty(&user.ctx(), id, req).await?,
    ))
}

/// List feedback
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/feedback",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses((status = 200, description = "Feedback, oldest first"))
)]
pub async fn list_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
) -> ApiResult<ApiResponse<Vec<FeedbackDto>>> {
    Ok(ApiResponse::success(
        state.questions.list_feedback(&user.ctx(), id).await?,
    ))
}

/// Add feedback
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/feedback",
    tag = "questions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 201, description = "Feedback added"),
        (status = 422, description = "Empty or too long", body = ErrorResponse),
    )
)]
pub async fn add_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams(id): PathParams<QuestionId>,
    ValidatedJson(req): ValidatedJson<FeedbackRequest>,
) -> ApiResult<Created<FeedbackDto>> {
    Ok(Created(
        state.questions.add_feedback(&user.ctx(), id, req).await?,
    ))
}

/// Edit feedback
///
/// Only the author may edit.
#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}/feedback/{feedback_id}",
    tag = "questions",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Question ID (UUID)"),
        ("feedback_id" = String, Path, description = "Feedback ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Feedback updated"),
        (status = 403, description = "Not the author", body = ErrorResponse),
    )
)]
pub async fn update_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams((id, feedback_id)): PathParams<(QuestionId, FeedbackId)>,
    ValidatedJson(req): ValidatedJson<FeedbackRequest>,
) -> ApiResult<ApiResponse<FeedbackDto>> {
    Ok(ApiResponse::success(
        state
            .questions
            .update_feedback(&user.ctx(), id, feedback_id, req)
            .await?,
    ))
}

/// Delete feedback
///
/// The author or a group admin.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}/feedback/{feedback_id}",
    tag = "questions",
    security(("bearer" = [])),
    params(
        ("id" = String, Path, description = "Question ID (UUID)"),
        ("feedback_id" = String, Path, description = "Feedback ID (UUID)"),
    ),
    responses(
        (status = 204, description = "Feedback deleted"),
        (status = 403, description = "Not the author or an admin", body = ErrorResponse),
    )
)]
pub async fn delete_feedback(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    PathParams((id, feedback_id)): PathParams<(QuestionId, FeedbackId)>,
) -> ApiResult<NoContent> {
    state
        .questions
        .delete_feedback(&user.ctx(), id, feedback_id)
        .await?;
    Ok(NoContent)
}
