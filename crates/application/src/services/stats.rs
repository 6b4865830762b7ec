//! Stats Service
//!
//! Loads the documents a statistic needs and hands them to the engine.
//! Nothing is cached; every call recomputes from the stored documents.

use super::{
    load_group, user_summaries, GroupPolicy, GroupRepositoryPort, QuestionRepositoryPort,
    ServiceConfig, ServiceContext, UserRepositoryPort,
};
use crate::stats::{
    ActivityPoint, GroupOverview, LeaderboardEntry, MemberStats, QuestionStats, StatsEngine,
    UserStats,
};
use crate::{ApplicationError, ApplicationResult};
use std::sync::Arc;
use studyhub_domain::errors::QuestionError;
use studyhub_domain::{Group, GroupId, Question, QuestionId, UserId};
use tracing::{debug, instrument};

/// Stats service implementation
pub struct StatsService {
    questions: Arc<dyn QuestionRepositoryPort>,
    groups: Arc<dyn GroupRepositoryPort>,
    users: Arc<dyn UserRepositoryPort>,
    engine: StatsEngine,
}

impl StatsService {
    pub fn new(
        questions: Arc<dyn QuestionRepositoryPort>,
        groups: Arc<dyn GroupRepositoryPort>,
        users: Arc<dyn UserRepositoryPort>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            questions,
            groups,
            users,
            engine: StatsEngine::new(config.stats),
        }
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn question_stats(
        &self,
        ctx: &ServiceContext,
        question_id: QuestionId,
    ) -> ApplicationResult<QuestionStats> {
        ctx.require_authenticated()?;
        let question = self
            .questions
            .get(question_id)
            .await?
            .ok_or(QuestionError::NotFound(question_id))?;
        let group = load_group(self.groups.as_ref(), question.group_id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;

        Ok(self.engine.question_stats(&group, &question))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn group_stats(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
    ) -> ApplicationResult<GroupOverview> {
        let (group, questions) = self.load(ctx, group_id).await?;
        let users = user_summaries(self.users.as_ref(), &group.member_ids()).await?;

        let overview =
            self.engine
                .group_overview(&group, &questions, &users, studyhub_common::now_utc());
        debug!(total_solves = overview.total_solves, "Group stats computed");
        Ok(overview)
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn group_leaderboard(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
    ) -> ApplicationResult<Vec<LeaderboardEntry>> {
        let (group, questions) = self.load(ctx, group_id).await?;
        let users = user_summaries(self.users.as_ref(), &group.member_ids()).await?;

        Ok(self
            .engine
            .leaderboard(&group, &questions, &users, studyhub_common::now_utc()))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn member_stats(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
        user_id: UserId,
    ) -> ApplicationResult<MemberStats> {
        let (group, questions) = self.load(ctx, group_id).await?;

        self.engine
            .member_stats(&group, &questions, user_id, studyhub_common::now_utc())
            .ok_or_else(|| {
                ApplicationError::NotFound("User is not a member of this group".to_string())
            })
    }

    /// Daily solves and rolling averages; `days` is clamped to `1..=365`
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn group_activity(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
        days: Option<u32>,
    ) -> ApplicationResult<Vec<ActivityPoint>> {
        let (group, questions) = self.load(ctx, group_id).await?;
        let days = self.engine.activity_days(days);

        Ok(self
            .engine
            .activity(&group, &questions, studyhub_common::now_utc(), days))
    }

    /// The caller's aggregates across all their groups
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn my_stats(&self, ctx: &ServiceContext) -> ApplicationResult<UserStats> {
        let user_id = ctx.require_authenticated()?;

        let groups = self.groups.list_all_for_member(user_id).await?;
        let group_ids: Vec<GroupId> = groups.iter().map(|g| g.id).collect();
        let questions = self.questions.list_for_groups(&group_ids).await?;

        Ok(self
            .engine
            .user_stats(user_id, &groups, &questions, studyhub_common::now_utc()))
    }

    async fn load(
        &self,
        ctx: &ServiceContext,
        group_id: GroupId,
    ) -> ApplicationResult<(Group, Vec<Question>)> {
        ctx.require_authenticated()?;
        let group = load_group(self.groups.as_ref(), group_id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;

        let questions = self.questions.list_all_for_group(group_id).await?;
        Ok((group, questions))
    }
}
