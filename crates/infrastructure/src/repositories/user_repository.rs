//! User repository implementation.
//!
//! PostgreSQL-backed implementation of the user port. The account is kept
//! as a JSONB document; `email` and `username` are mirrored into columns
//! carrying the unique indexes.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use studyhub_application::services::UserRepositoryPort;
use studyhub_application::ApplicationResult;
use studyhub_domain::{User, UserId};

use super::{decode_all, decode_optional, encode};
use crate::Error;

/// PostgreSQL implementation of the user port.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PostgreSQL user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryPort for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> ApplicationResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(encode(user)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_write(e, "User"))?;

        debug!("User created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: UserId) -> ApplicationResult<Option<User>> {
        let row = sqlx::query("SELECT doc FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[UserId]) -> ApplicationResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query("SELECT doc FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_all(rows)?)
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> ApplicationResult<Option<User>> {
        let row = sqlx::query("SELECT doc FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> ApplicationResult<Option<User>> {
        let row = sqlx::query("SELECT doc FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(decode_optional(row)?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> ApplicationResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, doc = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(encode(user)?)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::on_write(e, "User"))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {}", user.id)).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> ApplicationResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(deleted = result.rows_affected() > 0, "User delete");
        Ok(result.rows_affected() > 0)
    }
}
