//! Application state and dependency injection.
//!
//! This module defines the shared application state that is passed
//! to all route handlers via Axum's state extraction.

use crate::auth::TokenService;
use std::sync::Arc;
use std::time::Instant;
use studyhub_application::services::{
    Argon2PasswordHasher, EventPublisher, GroupService, PasswordHasher, QuestionService,
    StatsService, TracingEventPublisher, UserService,
};
use studyhub_application::ServiceConfig;
use studyhub_common::AppConfig;
use studyhub_infrastructure::{DatabasePool, Repositories};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Access token signing and verification
    pub tokens: Arc<TokenService>,

    /// Accounts and authentication
    pub users: Arc<UserService>,

    /// Groups and membership
    pub groups: Arc<GroupService>,

    /// Questions, responses, ratings and feedback
    pub questions: Arc<QuestionService>,

    /// Statistics engine
    pub stats: Arc<StatsService>,

    /// PostgreSQL pool, absent when running on the in-memory store
    pub database: Option<DatabasePool>,

    /// Process start, for the uptime reported by `/health`
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services over `repositories`
    pub fn new(config: AppConfig, repositories: Repositories, database: Option<DatabasePool>) -> Self {
        Self::with_password_hasher(config, repositories, database, Arc::new(Argon2PasswordHasher))
    }

    /// State backed by the in-memory store; suitable for development and
    /// testing
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Repositories::in_memory(), None)
    }

    /// Like [`AppState::new`] with a custom password hasher
    pub fn with_password_hasher(
        config: AppConfig,
        repositories: Repositories,
        database: Option<DatabasePool>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let service_config = ServiceConfig::from_app_config(&config);
        let events: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);
        let Repositories {
            users,
            groups,
            questions,
        } = repositories;

        let user_service = UserService::new(
            Arc::clone(&users),
            Arc::clone(&groups),
            password_hasher,
            Arc::clone(&events),
        );
        let group_service = GroupService::new(
            Arc::clone(&groups),
            Arc::clone(&questions),
            Arc::clone(&users),
            Arc::clone(&events),
            service_config.clone(),
        );
        let question_service = QuestionService::new(
            Arc::clone(&questions),
            Arc::clone(&groups),
            Arc::clone(&users),
            events,
            service_config.clone(),
        );
        let stats_service = StatsService::new(questions, groups, users, service_config);

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_expiry_seconds);

        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: Arc::new(user_service),
            groups: Arc::new(group_service),
            questions: Arc::new(question_service),
            stats: Arc::new(stats_service),
            database,
            started_at: Instant::now(),
        }
    }
}
