use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Registry row mapping a public share id to the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShareRecord {
    pub username: String,
    pub share_id: String,
    pub generated_at: DateTime<Utc>,
}
