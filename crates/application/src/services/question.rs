//! Question Service
//!
//! Questions posted to a group, and the per-member activity embedded in
//! them: responses, difficulty ratings and feedback. Every operation
//! requires membership of the question's group.

use super::{
    emit, load_group, user_summaries, EventPublisher, GroupPolicy, GroupRepositoryPort,
    ServiceConfig, ServiceContext, ServiceEvent, UserRepositoryPort,
};
use crate::dto::{FeedbackDto, QuestionDto, ResponseDto};
use crate::stats::StatsEngine;
use crate::validation::{
    normalize_tags, CreateQuestionRequest, FeedbackRequest, QuestionFilters,
    RateDifficultyRequest, UpdateQuestionRequest, UpsertResponseRequest, Validatable,
};
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use std::sync::Arc;
use studyhub_common::{PaginatedResult, PaginationParams};
use studyhub_domain::errors::QuestionError;
use studyhub_domain::{FeedbackId, Group, GroupId, Question, QuestionId, ResponseInput, UserId};
use tracing::{debug, info, instrument};

/// Question repository trait
#[async_trait]
pub trait QuestionRepositoryPort: Send + Sync {
    async fn create(&self, question: &Question) -> ApplicationResult<()>;
    async fn get(&self, id: QuestionId) -> ApplicationResult<Option<Question>>;
    /// Replaces the stored document; last writer wins.
    async fn update(&self, question: &Question) -> ApplicationResult<()>;
    async fn delete(&self, id: QuestionId) -> ApplicationResult<bool>;
    /// A group's questions matching `filters`, newest first.
    async fn list(
        &self,
        group_id: GroupId,
        filters: &QuestionFilters,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Question>>;
    async fn list_all_for_group(&self, group_id: GroupId) -> ApplicationResult<Vec<Question>>;
    async fn list_for_groups(&self, group_ids: &[GroupId]) -> ApplicationResult<Vec<Question>>;
    /// Returns the number of questions removed.
    async fn delete_by_group(&self, group_id: GroupId) -> ApplicationResult<u64>;
}

/// Question service implementation
pub struct QuestionService {
    questions: Arc<dyn QuestionRepositoryPort>,
    groups: Arc<dyn GroupRepositoryPort>,
    users: Arc<dyn UserRepositoryPort>,
    event_publisher: Arc<dyn EventPublisher>,
    engine: StatsEngine,
}

impl QuestionService {
    pub fn new(
        questions: Arc<dyn QuestionRepositoryPort>,
        groups: Arc<dyn GroupRepositoryPort>,
        users: Arc<dyn UserRepositoryPort>,
        event_publisher: Arc<dyn EventPublisher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            questions,
            groups,
            users,
            event_publisher,
            engine: StatsEngine::new(config.stats),
        }
    }

    /// Post a question to a group
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_question(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
        request: CreateQuestionRequest,
    ) -> ApplicationResult<QuestionDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let group = load_group(self.groups.as_ref(), group_id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;

        let mut question = Question::new(
            group_id,
            user_id,
            request.title.trim(),
            request.platform,
            request.difficulty,
        );
        question.link = request
            .link
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        question.tags = normalize_tags(&request.tags);
        question.notes = request.notes.unwrap_or_default();

        self.questions.create(&question).await?;

        info!(question_id = %question.id, group_id = %group_id, "Question created");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::QuestionCreated {
                question_id: question.id,
                group_id,
            },
        )
        .await;

        Ok(self.view(&group, &question, user_id))
    }

    /// A group's questions, newest first
    #[instrument(skip(self, ctx, filters), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_questions(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
        filters: QuestionFilters,
        pagination: PaginationParams,
    ) -> ApplicationResult<PaginatedResult<QuestionDto>> {
        let user_id = ctx.require_authenticated()?;
        let group = load_group(self.groups.as_ref(), group_id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;

        let filters = filters.normalized();
        let page = self.questions.list(group_id, &filters, &pagination).await?;
        debug!(total = page.total, "Questions listed");

        Ok(page.map(|q| self.view(&group, &q, user_id)))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_question(
        &self,
        ctx: &ServiceContext,
        id: QuestionId,
    ) -> ApplicationResult<QuestionDto> {
        let user_id = ctx.require_authenticated()?;
        let (question, group) = self.load_visible(ctx, id).await?;
        Ok(self.view(&group, &question, user_id))
    }

    /// Edit a question (author, or group owner/admin)
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_question(
        &self,
        ctx: &ServiceContext,
        id: QuestionId,
        request: UpdateQuestionRequest,
    ) -> ApplicationResult<QuestionDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let (mut question, group) = self.load_visible(ctx, id).await?;
        Self::ensure_can_edit(ctx, &group, &question)?;

        if let Some(title) = request.title {
            question.title = title.trim().to_string();
        }
        if let Some(link) = request.link {
            let link = link.trim().to_string();
            question.link = (!link.is_empty()).then_some(link);
        }
        if let Some(platform) = request.platform {
            question.platform = platform;
        }
        if let Some(difficulty) = request.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(tags) = request.tags {
            question.tags = normalize_tags(&tags);
        }
        if let Some(notes) = request.notes {
            question.notes = notes;
        }
        question.updated_at = studyhub_common::now_utc();
        self.questions.update(&question).await?;

        info!(question_id = %id, "Question updated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::QuestionUpdated { question_id: id },
        )
        .await;

        Ok(self.view(&group, &question, user_id))
    }

    /// Delete a question (author, or group owner/admin)
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_question(&self, ctx: &ServiceContext, id: QuestionId) -> ApplicationResult<()> {
        ctx.require_authenticated()?;
        let (question, group) = self.load_visible(ctx, id).await?;
        Self::ensure_can_edit(ctx, &group, &question)?;

        self.questions.delete(id).await?;

        info!(question_id = %id, "Question deleted");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::QuestionDeleted {
                question_id: id,
                group_id: group.id,
            },
        )
        .await;

        Ok(())
    }

    /// Record or replace the caller's response
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn upsert_response(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
        request: UpsertResponseRequest,
    ) -> ApplicationResult<ResponseDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let (mut question, _) = self.load_visible(ctx, question_id).await?;
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApplicationError::Unauthorized("Account no longer exists".to_string()))?;

        let now = studyhub_common::now_utc();
        let input = ResponseInput {
            status: request.status,
            time_taken_minutes: request.time_taken_minutes,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };
        let response = question.upsert_response(user_id, input, now).clone();
        self.questions.update(&question).await?;

        info!(question_id = %question_id, status = ?response.status, "Response recorded");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::ResponseRecorded {
                question_id,
                user_id,
                solved: response.is_solved(),
            },
        )
        .await;

        Ok(ResponseDto::new(&response, user.summary()))
    }

    /// Remove the caller's response
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_response(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
    ) -> ApplicationResult<()> {
        let user_id = ctx.require_authenticated()?;
        let (mut question, _) = self.load_visible(ctx, question_id).await?;

        question.remove_response(user_id)?;
        self.questions.update(&question).await?;

        info!(question_id = %question_id, "Response deleted");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::ResponseDeleted {
                question_id,
                user_id,
            },
        )
        .await;

        Ok(())
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_responses(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
    ) -> ApplicationResult<Vec<ResponseDto>> {
        ctx.require_authenticated()?;
        let (question, _) = self.load_visible(ctx, question_id).await?;

        let ids: Vec<UserId> = question.responses.iter().map(|r| r.user_id).collect();
        let users = user_summaries(self.users.as_ref(), &ids).await?;
        Ok(ResponseDto::list(&question, &users))
    }

    /// Record or replace the caller's difficulty rating
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn rate_difficulty(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
        request: RateDifficultyRequest,
    ) -> ApplicationResult<QuestionDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let (mut question, group) = self.load_visible(ctx, question_id).await?;
        question.upsert_rating(user_id, request.rating, studyhub_common::now_utc())?;
        self.questions.update(&question).await?;

        info!(question_id = %question_id, rating = request.rating, "Difficulty rated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::DifficultyRated {
                question_id,
                user_id,
                rating: request.rating,
            },
        )
        .await;

        Ok(self.view(&group, &question, user_id))
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn add_feedback(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
        request: FeedbackRequest,
    ) -> ApplicationResult<FeedbackDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let (mut question, _) = self.load_visible(ctx, question_id).await?;
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApplicationError::Unauthorized("Account no longer exists".to_string()))?;

        let feedback = question
            .add_feedback(user_id, request.body.trim(), studyhub_common::now_utc())
            .clone();
        self.questions.update(&question).await?;

        info!(question_id = %question_id, feedback_id = %feedback.id, "Feedback added");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::FeedbackAdded {
                question_id,
                feedback_id: feedback.id,
            },
        )
        .await;

        Ok(FeedbackDto::new(&feedback, user.summary()))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_feedback(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
    ) -> ApplicationResult<Vec<FeedbackDto>> {
        ctx.require_authenticated()?;
        let (question, _) = self.load_visible(ctx, question_id).await?;

        let ids: Vec<UserId> = question.feedback.iter().map(|f| f.user_id).collect();
        let users = user_summaries(self.users.as_ref(), &ids).await?;
        Ok(FeedbackDto::list(&question, &users))
    }

    /// Edit feedback (author only)
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_feedback(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
        feedback_id: FeedbackId,
        request: FeedbackRequest,
    ) -> ApplicationResult<FeedbackDto> {
        let user_id = ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let (mut question, _) = self.load_visible(ctx, question_id).await?;
        if question.find_feedback(feedback_id)?.user_id != user_id {
            return Err(ApplicationError::Forbidden(
                "Only the author can edit feedback".to_string(),
            ));
        }

        let feedback = question
            .update_feedback(feedback_id, request.body.trim(), studyhub_common::now_utc())?
            .clone();
        self.questions.update(&question).await?;

        info!(question_id = %question_id, feedback_id = %feedback_id, "Feedback updated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::FeedbackUpdated {
                question_id,
                feedback_id,
            },
        )
        .await;

        let author = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApplicationError::Unauthorized("Account no longer exists".to_string()))?;
        Ok(FeedbackDto::new(&feedback, author.summary()))
    }

    /// Delete feedback (author, or group owner/admin)
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_feedback(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
        feedback_id: FeedbackId,
    ) -> ApplicationResult<()> {
        let user_id = ctx.require_authenticated()?;
        let (mut question, group) = self.load_visible(ctx, question_id).await?;

        let author = question.find_feedback(feedback_id)?.user_id;
        if author != user_id {
            GroupPolicy::can_manage(ctx, &group).ensure_allowed()?;
        }

        question.remove_feedback(feedback_id)?;
        self.questions.update(&question).await?;

        info!(question_id = %question_id, feedback_id = %feedback_id, "Feedback deleted");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::FeedbackDeleted {
                question_id,
                feedback_id,
            },
        )
        .await;

        Ok(())
    }

    /// Load a question and its group, checking the caller can see them.
    async fn load_visible(
        &self,
        ctx: &ServiceContext,
        id: QuestionId,
    ) -> ApplicationResult<(Question, Group)> {
        let question = self
            .questions
            .get(id)
            .await?
            .ok_or(QuestionError::NotFound(id))?;
        let group = load_group(self.groups.as_ref(), question.group_id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;
        Ok((question, group))
    }

    fn ensure_can_edit(
        ctx: &ServiceContext,
        group: &Group,
        question: &Question,
    ) -> ApplicationResult<()> {
        if ctx.user_id == Some(question.author_id) {
            return Ok(());
        }
        GroupPolicy::can_manage(ctx, group)
            .ensure_allowed()
            .map_err(|_| {
                ApplicationError::Forbidden(
                    "Only the author or a group owner/admin can change this question".to_string(),
                )
            })
    }

    fn view(&self, group: &Group, question: &Question, viewer: UserId) -> QuestionDto {
        let stats = self.engine.question_stats(group, question);
        QuestionDto::new(question, &stats, Some(viewer))
    }
}
