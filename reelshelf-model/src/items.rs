use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Descriptive fields that identify a book independent of who submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookFields {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub author: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub publisher: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub isbn: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pages: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<i32>,
}

/// Descriptive fields that identify a movie independent of who submitted it.
///
/// `duration` is the runtime in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieFields {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub studio: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub director: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub writer: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<i32>,
}

/// A persisted book owned by exactly one submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Book {
    pub id: Uuid,
    pub submitter: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BookFields,
}

/// A persisted movie owned by exactly one submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Movie {
    pub id: Uuid,
    pub submitter: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: MovieFields,
}
