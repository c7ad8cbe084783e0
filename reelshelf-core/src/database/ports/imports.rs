use async_trait::async_trait;

use crate::error::Result;
use crate::transfer::{ImportPlan, ImportSummary};

#[async_trait]
pub trait ImportRepository: Send + Sync {
    /// Inserts every item and list entry in the plan in one transaction.
    ///
    /// Any failure rolls the whole import back and surfaces as
    /// `CoreError::ImportFailed`.
    async fn import_profile(&self, plan: &ImportPlan) -> Result<ImportSummary>;
}
