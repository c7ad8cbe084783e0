use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::items::{Book, Movie};

/// Reading status of a book on a user's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BookStatus {
    Planned,
    Reading,
    Completed,
    Paused,
    Dropped,
}

impl BookStatus {
    pub const ALL: [BookStatus; 5] = [
        BookStatus::Planned,
        BookStatus::Reading,
        BookStatus::Completed,
        BookStatus::Paused,
        BookStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Planned => "planned",
            BookStatus::Reading => "reading",
            BookStatus::Completed => "completed",
            BookStatus::Paused => "paused",
            BookStatus::Dropped => "dropped",
        }
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus {
                kind: "book",
                value: s.to_string(),
            })
    }
}

/// Viewing status of a movie on a user's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MovieStatus {
    Planned,
    Watching,
    Completed,
    Paused,
    Dropped,
}

impl MovieStatus {
    pub const ALL: [MovieStatus; 5] = [
        MovieStatus::Planned,
        MovieStatus::Watching,
        MovieStatus::Completed,
        MovieStatus::Paused,
        MovieStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::Planned => "planned",
            MovieStatus::Watching => "watching",
            MovieStatus::Completed => "completed",
            MovieStatus::Paused => "paused",
            MovieStatus::Dropped => "dropped",
        }
    }
}

impl Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MovieStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus {
                kind: "movie",
                value: s.to_string(),
            })
    }
}

/// Per-user metadata attached to an item on that user's list.
///
/// `score` is an integer in `0..=10` when present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListEntry<S> {
    pub status: S,
    #[cfg_attr(feature = "serde", serde(default))]
    pub score: Option<i16>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_date: Option<NaiveDate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub note: Option<String>,
}

impl<S> ListEntry<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            score: None,
            start_date: None,
            end_date: None,
            note: None,
        }
    }

    pub fn with_score(mut self, score: i16) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_dates(
        mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookListItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub book: Book,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<BookStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieListItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub movie: Movie,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<MovieStatus>,
}

/// A completed, scored item as it appears on a share card.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopItem {
    pub title: String,
    pub score: i16,
    pub end_date: Option<NaiveDate>,
}
