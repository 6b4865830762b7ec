//! Group repository implementation.
//!
//! Groups are stored as JSONB documents with their member list embedded.
//! Membership queries use JSONB containment on `doc -> 'members'`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use studyhub_application::services::GroupRepositoryPort;
use studyhub_application::ApplicationResult;
use studyhub_common::{PaginatedResult, PaginationParams};
use studyhub_domain::{Group, GroupId, UserId};

use super::{decode_all, decode_optional, encode};
use crate::Error;

const MEMBER_FILTER: &str =
    "doc -> 'members' @> jsonb_build_array(jsonb_build_object('user_id', $1::text))";

/// PostgreSQL implementation of the group port.
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    /// Create a new PostgreSQL group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepositoryPort for PgGroupRepository {
    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn create(&self, group: &Group) -> ApplicationResult<()> {
        sqlx::query(
            r#"
            INSERT INTO groups (id, invite_code, owner_id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(group.id.as_uuid())
        .bind(&group.invite_code)
        .bind(group.owner_id.as_uuid())
        .bind(encode(group)?)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_write(e, "Invite code"))?;

        debug!("Group created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: GroupId) -> ApplicationResult<Option<Group>> {
        let row = sqlx::query("SELECT doc FROM groups WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self, code))]
    async fn find_by_invite_code(&self, code: &str) -> ApplicationResult<Option<Group>> {
        let row = sqlx::query("SELECT doc FROM groups WHERE UPPER(invite_code) = UPPER($1)")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self, pagination))]
    async fn list_for_member(
        &self,
        user_id: UserId,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Group>> {
        let member = user_id.to_string();

        let count_sql = format!("SELECT COUNT(*) FROM groups WHERE {}", MEMBER_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&member)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let list_sql = format!(
            "SELECT doc FROM groups WHERE {} ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            MEMBER_FILTER
        );
        let rows = sqlx::query(&list_sql)
            .bind(&member)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
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
    async fn list_all_for_member(&self, user_id: UserId) -> ApplicationResult<Vec<Group>> {
        let sql = format!(
            "SELECT doc FROM groups WHERE {} ORDER BY created_at DESC, id",
            MEMBER_FILTER
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_all(rows)?)
    }

    #[instrument(skip(self))]
    async fn count_owned_by(&self, user_id: UserId) -> ApplicationResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups WHERE owner_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(count as u64)
    }

    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn update(&self, group: &Group) -> ApplicationResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET invite_code = $2, owner_id = $3, doc = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(group.id.as_uuid())
        .bind(&group.invite_code)
        .bind(group.owner_id.as_uuid())
        .bind(encode(group)?)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_write(e, "Invite code"))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Group {}", group.id)).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: GroupId) -> ApplicationResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
