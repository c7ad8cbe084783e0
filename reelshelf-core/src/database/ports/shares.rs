use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelshelf_model::ShareRecord;

use crate::error::Result;
use crate::share::ShareId;

/// Maps public share ids to usernames. At most one row per username.
#[async_trait]
pub trait ShareRegistry: Send + Sync {
    /// Upsert keyed by username; a previous id for the same user stops
    /// resolving.
    async fn register_share(
        &self,
        username: &str,
        share_id: &ShareId,
        generated_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn resolve_share(&self, share_id: &ShareId) -> Result<Option<String>>;

    /// Every row stored for the user, oldest first.
    async fn list_shares(&self, username: &str) -> Result<Vec<ShareRecord>>;

    async fn delete_share(&self, username: &str) -> Result<bool>;
}
