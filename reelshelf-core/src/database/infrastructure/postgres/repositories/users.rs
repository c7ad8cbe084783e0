use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    database::ports::users::{SessionRecord, UserRecord, UsersRepository},
    error::{CoreError, Result},
};

#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_user(row: &PgRow) -> std::result::Result<UserRecord, sqlx::Error> {
        Ok(UserRecord {
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            enabled: row.try_get("enabled")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING username, password_hash, enabled, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to create user: {e}")))?;

        match row {
            Some(row) => Self::map_user(&row).map_err(|e| {
                CoreError::Internal(format!("Failed to decode user: {e}"))
            }),
            None => Err(CoreError::Conflict(format!(
                "username {username} is already taken"
            ))),
        }
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT username, password_hash, enabled, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to load user: {e}")))?;

        row.map(|row| Self::map_user(&row))
            .transpose()
            .map_err(|e| CoreError::Internal(format!("Failed to decode user: {e}")))
    }

    async fn set_enabled(&self, username: &str, enabled: bool) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET enabled = $2 WHERE username = $1")
                .bind(username)
                .bind(enabled)
                .execute(self.pool())
                .await
                .map_err(|e| {
                    CoreError::Internal(format!("Failed to update user: {e}"))
                })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("user {username}")));
        }
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to delete user: {e}"))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_session(
        &self,
        token_hash: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, username, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token_hash)
        .bind(username)
        .bind(expires_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to create session: {e}"))
        })?;
        Ok(())
    }

    async fn find_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>> {
        let row = sqlx::query(
            "SELECT username, expires_at FROM sessions WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to load session: {e}")))?;

        row.map(|row| -> std::result::Result<SessionRecord, sqlx::Error> {
            Ok(SessionRecord {
                username: row.try_get("username")?,
                expires_at: row.try_get("expires_at")?,
            })
        })
        .transpose()
        .map_err(|e| {
            CoreError::Internal(format!("Failed to decode session: {e}"))
        })
    }
}
