use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRecord>;

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>>;

    async fn set_enabled(&self, username: &str, enabled: bool) -> Result<()>;

    /// Cascades to items, list entries, sessions and the share record.
    async fn delete_user(&self, username: &str) -> Result<bool>;

    async fn create_session(
        &self,
        token_hash: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn find_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>>;
}
