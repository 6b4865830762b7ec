//! Repository implementations for data persistence.
//!
//! Each application port has a PostgreSQL adapter and an in-memory one.
//! Both store whole documents and agree on ordering and uniqueness rules.

mod group_repository;
mod memory;
mod question_repository;
mod user_repository;

pub use group_repository::PgGroupRepository;
pub use memory::{InMemoryGroupRepository, InMemoryQuestionRepository, InMemoryUserRepository};
pub use question_repository::PgQuestionRepository;
pub use user_repository::PgUserRepository;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, Row};
use std::sync::Arc;

use studyhub_application::services::{
    GroupRepositoryPort, QuestionRepositoryPort, UserRepositoryPort,
};

use crate::{DatabasePool, Error, Result};

/// The full set of repository ports handed to the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepositoryPort>,
    pub groups: Arc<dyn GroupRepositoryPort>,
    pub questions: Arc<dyn QuestionRepositoryPort>,
}

impl Repositories {
    /// Process-local storage; contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            questions: Arc::new(InMemoryQuestionRepository::new()),
        }
    }

    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.pool().clone())),
            groups: Arc::new(PgGroupRepository::new(pool.pool().clone())),
            questions: Arc::new(PgQuestionRepository::new(pool.pool().clone())),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

pub(crate) fn encode<T: Serialize>(doc: &T) -> Result<serde_json::Value> {
    serde_json::to_value(doc).map_err(Error::Serialization)
}

fn decode<T: DeserializeOwned>(row: PgRow) -> Result<T> {
    let doc: serde_json::Value = row.try_get("doc").map_err(Error::Database)?;
    serde_json::from_value(doc).map_err(Error::Serialization)
}

pub(crate) fn decode_optional<T: DeserializeOwned>(row: Option<PgRow>) -> Result<Option<T>> {
    row.map(decode).transpose()
}

pub(crate) fn decode_all<T: DeserializeOwned>(rows: Vec<PgRow>) -> Result<Vec<T>> {
    rows.into_iter().map(decode).collect()
}
