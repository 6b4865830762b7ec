//! Question repository implementation.
//!
//! A question document embeds its responses, ratings and feedback, so every
//! write replaces the whole `doc`. List filters run against JSONB fields.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use studyhub_application::services::QuestionRepositoryPort;
use studyhub_application::validation::QuestionFilters;
use studyhub_application::ApplicationResult;
use studyhub_common::{PaginatedResult, PaginationParams};
use studyhub_domain::{GroupId, Question, QuestionId};

use super::{decode_all, decode_optional, encode};
use crate::Error;

/// PostgreSQL implementation of the question port.
pub struct PgQuestionRepository {
    pool: PgPool,
}

impl PgQuestionRepository {
    /// Create a new PostgreSQL question repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally under ILIKE.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// WHERE clause for `filters`, with `$1` bound to the group id.
fn where_clause(filters: &QuestionFilters) -> String {
    let mut conditions = vec!["group_id = $1".to_string()];
    let mut param_count = 1;

    if filters.difficulty.is_some() {
        param_count += 1;
        conditions.push(format!("doc ->> 'difficulty' = ${}", param_count));
    }
    if filters.platform.is_some() {
        param_count += 1;
        conditions.push(format!("doc ->> 'platform' = ${}", param_count));
    }
    if filters.tag.is_some() {
        param_count += 1;
        conditions.push(format!("doc -> 'tags' ? ${}", param_count));
    }
    if filters.search.is_some() {
        param_count += 1;
        conditions.push(format!("doc ->> 'title' ILIKE ${}", param_count));
    }

    conditions.join(" AND ")
}

/// Bind filter values in the order `where_clause` numbered them.
macro_rules! bind_filters {
    ($query:expr, $group_id:expr, $filters:expr) => {{
        let mut query = $query.bind($group_id);
        if let Some(difficulty) = $filters.difficulty {
            query = query.bind(difficulty.as_str());
        }
        if let Some(platform) = $filters.platform {
            query = query.bind(platform.as_str());
        }
        if let Some(ref tag) = $filters.tag {
            query = query.bind(tag.clone());
        }
        if let Some(ref search) = $filters.search {
            query = query.bind(like_pattern(search));
        }
        query
    }};
}

#[async_trait]
impl QuestionRepositoryPort for PgQuestionRepository {
    #[instrument(skip(self, question), fields(question_id = %question.id))]
    async fn create(&self, question: &Question) -> ApplicationResult<()> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, group_id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(question.id.as_uuid())
        .bind(question.group_id.as_uuid())
        .bind(encode(question)?)
        .bind(question.created_at)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_write(e, "Question"))?;

        debug!("Question created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: QuestionId) -> ApplicationResult<Option<Question>> {
        let row = sqlx::query("SELECT doc FROM questions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self, question), fields(question_id = %question.id))]
    async fn update(&self, question: &Question) -> ApplicationResult<()> {
        let result = sqlx::query("UPDATE questions SET doc = $2, updated_at = $3 WHERE id = $1")
            .bind(question.id.as_uuid())
            .bind(encode(question)?)
            .bind(question.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Question {}", question.id)).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: QuestionId) -> ApplicationResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, filters, pagination))]
    async fn list(
        &self,
        group_id: GroupId,
        filters: &QuestionFilters,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Question>> {
        let where_clause = where_clause(filters);
        let group_uuid = *group_id.as_uuid();

        let count_sql = format!("SELECT COUNT(*) FROM questions WHERE {}", where_clause);
        let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql), group_uuid, filters)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        // Page bounds are formatted in; they come from validated integers.
        let list_sql = format!(
            "SELECT doc FROM questions WHERE {} ORDER BY created_at DESC, id LIMIT {} OFFSET {}",
            where_clause,
            pagination.limit(),
            pagination.offset()
        );
        let rows = bind_filters!(sqlx::query(&list_sql), group_uuid, filters)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(PaginatedResult::from_params(
            decode_all(rows)?,
            pagination,
            total as u64,
        ))
    }

    #[instrument(skip(self))]
    async fn list_all_for_group(&self, group_id: GroupId) -> ApplicationResult<Vec<Question>> {
        let rows = sqlx::query(
            "SELECT doc FROM questions WHERE group_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(group_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(decode_all(rows)?)
    }

    #[instrument(skip(self, group_ids), fields(count = group_ids.len()))]
    async fn list_for_groups(&self, group_ids: &[GroupId]) -> ApplicationResult<Vec<Question>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = group_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            "SELECT doc FROM questions WHERE group_id = ANY($1) ORDER BY created_at DESC, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(decode_all(rows)?)
    }

    #[instrument(skip(self))]
    async fn delete_by_group(&self, group_id: GroupId) -> ApplicationResult<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE group_id = $1")
            .bind(group_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(removed = result.rows_affected(), "Group questions deleted");
        Ok(result.rows_affected())
    }
}
