//! Versioned profile snapshot exchanged by the export and import flows.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::items::{BookFields, MovieFields};
use crate::list::{BookStatus, ListEntry, MovieStatus};
use crate::share::ShareRecord;
use crate::stats::ProfileStats;

/// Version written by the current exporter and the only one the importer
/// accepts.
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub profile: Option<ProfileStats>,
    pub books: Vec<ExportedBook>,
    pub movies: Vec<ExportedMovie>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shares: Vec<ShareRecord>,
}

/// A book as written to an export document. `id` and `submitter` are carried
/// for reference only; importing discards both.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedBook {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<Uuid>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub submitter: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BookFields,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<BookStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportedMovie {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<Uuid>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub submitter: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: MovieFields,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<MovieStatus>,
}
