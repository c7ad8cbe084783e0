use chrono::NaiveDate;
use reelshelf_model::TopItem;

/// Number of items per column on a share card.
pub const TOP_ITEMS_LIMIT: usize = 10;

const MAX_TITLE_CHARS: usize = 25;
const TRUNCATED_TITLE_CHARS: usize = 22;

/// Shorten titles longer than 25 characters to their first 22 plus `...`.
///
/// Counts `char`s, not bytes.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let mut short: String =
            title.chars().take(TRUNCATED_TITLE_CHARS).collect();
        short.push_str("...");
        short
    } else {
        title.to_string()
    }
}

/// Everything a share image shows, already sorted and truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCard {
    pub username: String,
    pub books: Vec<TopItem>,
    pub movies: Vec<TopItem>,
    pub date: NaiveDate,
}

impl ShareCard {
    /// Build a card from items ordered best first. Keeps at most
    /// [`TOP_ITEMS_LIMIT`] per column and truncates long titles.
    pub fn new(
        username: impl Into<String>,
        books: Vec<TopItem>,
        movies: Vec<TopItem>,
        date: NaiveDate,
    ) -> Self {
        Self {
            username: username.into(),
            books: prepare(books),
            movies: prepare(movies),
            date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.movies.is_empty()
    }
}

fn prepare(items: Vec<TopItem>) -> Vec<TopItem> {
    items
        .into_iter()
        .take(TOP_ITEMS_LIMIT)
        .map(|item| TopItem {
            title: truncate_title(&item.title),
            ..item
        })
        .collect()
}
