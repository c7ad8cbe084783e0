use async_trait::async_trait;
use reelshelf_model::{BookStats, MovieStats, ScoreCount};
use sqlx::{PgPool, Row};

use crate::{
    database::ports::stats::{StatsRepository, UserInfo},
    error::{CoreError, Result},
};

#[derive(Clone, Debug)]
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn scores(&self, table: &str, username: &str) -> Result<Vec<ScoreCount>> {
        let query = format!(
            "SELECT score, COUNT(*)::INT8 AS count FROM {table} \
             WHERE username = $1 AND score IS NOT NULL \
             GROUP BY score"
        );
        let rows = sqlx::query(&query)
            .bind(username)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to load scores from {table}: {e}"))
            })?;

        rows.iter()
            .map(|row| -> std::result::Result<ScoreCount, sqlx::Error> {
                Ok(ScoreCount::new(row.try_get("score")?, row.try_get("count")?))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode score row: {e}")))
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    async fn user_info(&self, username: &str) -> Result<UserInfo> {
        let row = sqlx::query("SELECT username, created_at FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to load user: {e}")))?
            .ok_or_else(|| CoreError::NotFound(format!("user {username}")))?;

        Ok(UserInfo {
            username: row.try_get("username").map_err(|e| {
                CoreError::Internal(format!("Failed to decode user: {e}"))
            })?,
            member_since: row.try_get("created_at").map_err(|e| {
                CoreError::Internal(format!("Failed to decode user: {e}"))
            })?,
        })
    }

    async fn book_stats(&self, username: &str) -> Result<BookStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::INT8 AS count,
                AVG(e.score)::FLOAT8 AS average_score,
                COALESCE(SUM(b.pages) FILTER (WHERE e.status = 'completed'), 0)::INT8
                    AS total_pages
            FROM book_list_entries e
            JOIN books b ON b.id = e.book_id
            WHERE e.username = $1
            "#,
        )
        .bind(username)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to load book stats: {e}")))?;

        let decode = |e: sqlx::Error| {
            CoreError::Internal(format!("Failed to decode book stats: {e}"))
        };
        Ok(BookStats {
            count: row.try_get("count").map_err(decode)?,
            average_score: row.try_get("average_score").map_err(decode)?,
            total_pages: row.try_get("total_pages").map_err(decode)?,
            score_distribution: Vec::new(),
        })
    }

    async fn movie_stats(&self, username: &str) -> Result<MovieStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::INT8 AS count,
                AVG(e.score)::FLOAT8 AS average_score,
                COALESCE(SUM(m.duration) FILTER (WHERE e.status = 'completed'), 0)::INT8
                    AS total_runtime
            FROM movie_list_entries e
            JOIN movies m ON m.id = e.movie_id
            WHERE e.username = $1
            "#,
        )
        .bind(username)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to load movie stats: {e}")))?;

        let decode = |e: sqlx::Error| {
            CoreError::Internal(format!("Failed to decode movie stats: {e}"))
        };
        Ok(MovieStats {
            count: row.try_get("count").map_err(decode)?,
            average_score: row.try_get("average_score").map_err(decode)?,
            total_runtime: row.try_get("total_runtime").map_err(decode)?,
            score_distribution: Vec::new(),
        })
    }

    async fn book_scores(&self, username: &str) -> Result<Vec<ScoreCount>> {
        self.scores("book_list_entries", username).await
    }

    async fn movie_scores(&self, username: &str) -> Result<Vec<ScoreCount>> {
        self.scores("movie_list_entries", username).await
    }
}
