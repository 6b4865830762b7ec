//! Shared setup for service integration tests.
//!
//! Services are wired over the in-memory repositories. Passwords go
//! through a trivial hasher so tests don't pay for argon2.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use studyhub_application::dto::{GroupDto, UserDto};
use studyhub_application::services::{
    GroupService, NoOpEventPublisher, PasswordHasher, QuestionService, ServiceConfig,
    ServiceContext, StatsService, UserService,
};
use studyhub_application::validation::{
    CreateGroupRequest, CreateQuestionRequest, JoinGroupRequest, RegisterRequest,
};
use studyhub_application::ApplicationResult;
use studyhub_domain::{Difficulty, Platform};
use studyhub_infrastructure::Repositories;
use studyhub_testing::fixtures::{register_request_parts, TEST_PASSWORD};

pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        Ok(format!("plain${}", password))
    }

    async fn verify(&self, password: &str, hash: &str) -> ApplicationResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

pub struct Harness {
    pub repos: Repositories,
    pub users: UserService,
    pub groups: GroupService,
    pub questions: QuestionService,
    pub stats: StatsService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let repos = Repositories::in_memory();
        let events = Arc::new(NoOpEventPublisher);

        Self {
            users: UserService::new(
                repos.users.clone(),
                repos.groups.clone(),
                Arc::new(PlainHasher),
                events.clone(),
            ),
            groups: GroupService::new(
                repos.groups.clone(),
                repos.questions.clone(),
                repos.users.clone(),
                events.clone(),
                config.clone(),
            ),
            questions: QuestionService::new(
                repos.questions.clone(),
                repos.groups.clone(),
                repos.users.clone(),
                events,
                config.clone(),
            ),
            stats: StatsService::new(
                repos.questions.clone(),
                repos.groups.clone(),
                repos.users.clone(),
                config,
            ),
            repos,
        }
    }

    /// Register a fresh account and return it with a context acting as it.
    pub async fn register(&self) -> (UserDto, ServiceContext) {
        let (email, username, display_name) = register_request_parts();
        let user = self
            .users
            .register(
                &ServiceContext::anonymous("test"),
                RegisterRequest {
                    email,
                    username,
                    display_name,
                    password: TEST_PASSWORD.to_string(),
                },
            )
            .await
            .unwrap();
        let ctx = ServiceContext::authenticated(user.id, "test");
        (user, ctx)
    }

    pub async fn create_group(&self, owner: &ServiceContext, name: &str) -> GroupDto {
        self.groups
            .create_group(
                owner,
                CreateGroupRequest {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .unwrap()
    }

    /// Join `group` with the invite code the owner can see.
    pub async fn join(&self, ctx: &ServiceContext, group: &GroupDto) -> ApplicationResult<GroupDto> {
        let code = group.invite_code.clone().unwrap_or_default();
        self.groups
            .join_group(ctx, JoinGroupRequest { invite_code: code })
            .await
    }

    /// A group with an owner and `members` plain members.
    pub async fn group_with_members(
        &self,
        members: usize,
    ) -> (GroupDto, ServiceContext, Vec<ServiceContext>) {
        let (_, owner) = self.register().await;
        let group = self.create_group(&owner, "Graph Theory Club").await;
        let mut contexts = Vec::with_capacity(members);
        for _ in 0..members {
            let (_, ctx) = self.register().await;
            self.join(&ctx, &group).await.unwrap();
            contexts.push(ctx);
        }
        (group, owner, contexts)
    }
}

pub fn question_request(title: &str, difficulty: Difficulty) -> CreateQuestionRequest {
    CreateQuestionRequest {
        title: title.to_string(),
        link: None,
        platform: Platform::Leetcode,
        difficulty,
        tags: vec!["Arrays".to_string()],
        notes: None,
    }
}
