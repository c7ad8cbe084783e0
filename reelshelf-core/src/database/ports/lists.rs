use async_trait::async_trait;
use reelshelf_model::{
    BookFields, BookListItem, BookStatus, ListEntry, MovieFields,
    MovieListItem, MovieStatus, TopItem,
};

use crate::error::Result;

/// Per-user book and movie lists.
#[async_trait]
pub trait ListsRepository: Send + Sync {
    /// Creates the item with `username` as submitter and its list entry in
    /// one transaction.
    async fn add_book(
        &self,
        username: &str,
        fields: &BookFields,
        entry: &ListEntry<BookStatus>,
    ) -> Result<BookListItem>;

    async fn add_movie(
        &self,
        username: &str,
        fields: &MovieFields,
        entry: &ListEntry<MovieStatus>,
    ) -> Result<MovieListItem>;

    /// Newest first.
    async fn list_books(&self, username: &str) -> Result<Vec<BookListItem>>;

    async fn list_movies(&self, username: &str) -> Result<Vec<MovieListItem>>;

    /// Completed and scored, ordered by score descending then completion
    /// date descending with undated entries last.
    async fn top_completed_books(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<TopItem>>;

    async fn top_completed_movies(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<TopItem>>;
}
