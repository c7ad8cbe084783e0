use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelshelf_model::{BookStats, MovieStats, ScoreCount};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub member_since: DateTime<Utc>,
}

/// Read-only aggregates over a user's lists.
///
/// `book_stats`/`movie_stats` leave `score_distribution` empty; the sparse
/// rows come from `book_scores`/`movie_scores`.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// `NotFound` for an unknown user.
    async fn user_info(&self, username: &str) -> Result<UserInfo>;

    async fn book_stats(&self, username: &str) -> Result<BookStats>;

    async fn movie_stats(&self, username: &str) -> Result<MovieStats>;

    async fn book_scores(&self, username: &str) -> Result<Vec<ScoreCount>>;

    async fn movie_scores(&self, username: &str) -> Result<Vec<ScoreCount>>;
}
