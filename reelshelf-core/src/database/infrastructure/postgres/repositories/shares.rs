use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelshelf_model::ShareRecord;
use sqlx::{PgPool, Row};

use crate::{
    database::ports::shares::ShareRegistry,
    error::{CoreError, Result},
    share::ShareId,
};

#[derive(Clone, Debug)]
pub struct PostgresShareRegistry {
    pool: PgPool,
}

impl PostgresShareRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ShareRegistry for PostgresShareRegistry {
    async fn register_share(
        &self,
        username: &str,
        share_id: &ShareId,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO share_links (username, share_id, generated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO UPDATE SET
                share_id = EXCLUDED.share_id,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(username)
        .bind(share_id.as_str())
        .bind(generated_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!(
                "Failed to register share for {username}: {e}"
            ))
        })?;
        Ok(())
    }

    async fn resolve_share(&self, share_id: &ShareId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM share_links WHERE share_id = $1")
            .bind(share_id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to resolve share: {e}"))
            })?;

        row.map(|row| row.try_get::<String, _>("username"))
            .transpose()
            .map_err(|e| CoreError::Internal(format!("Failed to decode share: {e}")))
    }

    async fn list_shares(&self, username: &str) -> Result<Vec<ShareRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT username, share_id, generated_at
            FROM share_links
            WHERE username = $1
            ORDER BY generated_at
            "#,
        )
        .bind(username)
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to list shares: {e}")))?;

        rows.iter()
            .map(|row| -> std::result::Result<ShareRecord, sqlx::Error> {
                Ok(ShareRecord {
                    username: row.try_get("username")?,
                    share_id: row.try_get("share_id")?,
                    generated_at: row.try_get("generated_at")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode share: {e}")))
    }

    async fn delete_share(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM share_links WHERE username = $1")
            .bind(username)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to delete share: {e}"))
            })?;
        Ok(result.rows_affected() > 0)
    }
}
