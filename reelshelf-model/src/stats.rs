use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const SCORE_MIN: i16 = 0;
pub const SCORE_MAX: i16 = 10;

/// Number of rated list entries holding a given score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreCount {
    pub score: i16,
    pub count: i64,
}

impl ScoreCount {
    pub fn new(score: i16, count: i64) -> Self {
        Self { score, count }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookStats {
    pub count: i64,
    pub average_score: Option<f64>,
    /// Sum of page counts over completed books.
    pub total_pages: i64,
    pub score_distribution: Vec<ScoreCount>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovieStats {
    pub count: i64,
    pub average_score: Option<f64>,
    /// Sum of runtimes (minutes) over completed movies.
    pub total_runtime: i64,
    pub score_distribution: Vec<ScoreCount>,
}

/// Aggregate view of one user's lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfileStats {
    pub username: String,
    pub member_since: DateTime<Utc>,
    pub books: BookStats,
    pub movies: MovieStats,
}
