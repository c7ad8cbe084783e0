use std::collections::HashMap;

use reelshelf_model::{
    BookFields, BookStatus, EXPORT_VERSION, ExportDocument, ListEntry,
    MovieFields, MovieStatus,
};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::hashing::{ContentHash, ContentHashed};

/// A validated import, ready to be written.
///
/// Items carry no id or submitter; both are assigned on insert. List-entry
/// metadata is keyed by [`ContentHash`] so it can be re-attached to whatever
/// ids the database hands back. When two items hash identically the later
/// one's entry wins, and every copy of that item receives it.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub username: String,
    pub books: Vec<BookFields>,
    pub movies: Vec<MovieFields>,
    book_entries: HashMap<ContentHash, ListEntry<BookStatus>>,
    movie_entries: HashMap<ContentHash, ListEntry<MovieStatus>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub books: usize,
    pub movies: usize,
}

impl ImportPlan {
    /// Parse and validate a raw document. Schema mismatches and field
    /// problems surface as `CoreError::Validation` before any I/O.
    pub fn parse(username: &str, document: serde_json::Value) -> Result<Self> {
        let document: ExportDocument = serde_json::from_value(document)
            .map_err(|e| CoreError::validation(format!("document: {e}")))?;
        Self::from_document(username, document)
    }

    pub fn from_document(username: &str, document: ExportDocument) -> Result<Self> {
        let mut errors = Vec::new();

        if document.version != EXPORT_VERSION {
            errors.push(format!(
                "version: unsupported export version {}, expected {EXPORT_VERSION}",
                document.version
            ));
        }
        for (i, book) in document.books.iter().enumerate() {
            if book.fields.title.trim().is_empty() {
                errors.push(format!("books[{i}].title: must not be empty"));
            }
        }
        for (i, movie) in document.movies.iter().enumerate() {
            if movie.fields.title.trim().is_empty() {
                errors.push(format!("movies[{i}].title: must not be empty"));
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        let mut books = Vec::with_capacity(document.books.len());
        let mut book_entries = HashMap::with_capacity(document.books.len());
        for book in document.books {
            book_entries.insert(book.fields.content_hash(), book.entry);
            books.push(book.fields);
        }

        let mut movies = Vec::with_capacity(document.movies.len());
        let mut movie_entries = HashMap::with_capacity(document.movies.len());
        for movie in document.movies {
            movie_entries.insert(movie.fields.content_hash(), movie.entry);
            movies.push(movie.fields);
        }

        Ok(Self {
            username: username.to_string(),
            books,
            movies,
            book_entries,
            movie_entries,
        })
    }

    /// Entry for a book as returned by the database after insert.
    pub fn book_entry(&self, fields: &BookFields) -> Option<&ListEntry<BookStatus>> {
        self.book_entries.get(&fields.content_hash())
    }

    pub fn movie_entry(&self, fields: &MovieFields) -> Option<&ListEntry<MovieStatus>> {
        self.movie_entries.get(&fields.content_hash())
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(books: serde_json::Value, movies: serde_json::Value) -> serde_json::Value {
        json!({
            "version": 1,
            "exported_at": "2025-03-01T10:00:00Z",
            "books": books,
            "movies": movies,
        })
    }

    #[test]
    fn ids_and_submitters_are_discarded() {
        let plan = ImportPlan::parse(
            "bob",
            document(
                json!([{
                    "id": "6f1c2a8e-2b7a-4a1f-9a55-0c3b1c1d2e3f",
                    "submitter": "ada",
                    "title": "Dune",
                    "author": "Frank Herbert",
                    "status": "completed",
                    "score": 9
                }]),
                json!([]),
            ),
        )
        .unwrap();

        assert_eq!(plan.username, "bob");
        assert_eq!(plan.books.len(), 1);
        let entry = plan.book_entry(&plan.books[0]).unwrap();
        assert_eq!(entry.status, BookStatus::Completed);
        assert_eq!(entry.score, Some(9));
    }

    #[test]
    fn entries_are_found_by_content_not_position() {
        let plan = ImportPlan::parse(
            "bob",
            document(
                json!([]),
                json!([
                    { "title": "Alien", "duration": 117, "status": "completed", "score": 10 },
                    { "title": "Heat", "status": "planned" }
                ]),
            ),
        )
        .unwrap();

        let heat = MovieFields {
            title: "Heat".into(),
            ..Default::default()
        };
        assert_eq!(plan.movie_entry(&heat).unwrap().status, MovieStatus::Planned);

        let unknown = MovieFields {
            title: "Alien".into(),
            ..Default::default()
        };
        assert!(plan.movie_entry(&unknown).is_none());
    }

    #[test]
    fn duplicate_items_keep_the_last_entry() {
        let plan = ImportPlan::parse(
            "bob",
            document(
                json!([
                    { "title": "Dune", "status": "reading" },
                    { "title": "Dune", "status": "dropped", "note": "again" }
                ]),
                json!([]),
            ),
        )
        .unwrap();

        assert_eq!(plan.books.len(), 2);
        let entry = plan.book_entry(&plan.books[0]).unwrap();
        assert_eq!(entry.status, BookStatus::Dropped);
        assert_eq!(entry.note.as_deref(), Some("again"));
    }

    #[test]
    fn schema_mismatch_is_a_validation_error() {
        let err = ImportPlan::parse("bob", json!({ "books": "nope" })).unwrap_err();
        match err {
            CoreError::Validation(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].starts_with("document:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn field_problems_are_all_reported() {
        let mut doc = document(
            json!([{ "title": "Dune", "status": "reading" }, { "title": " ", "status": "reading" }]),
            json!([{ "title": "", "status": "watching" }]),
        );
        doc["version"] = json!(2);

        let err = ImportPlan::parse("bob", doc).unwrap_err();
        match err {
            CoreError::Validation(messages) => assert_eq!(
                messages,
                vec![
                    "version: unsupported export version 2, expected 1".to_string(),
                    "books[1].title: must not be empty".to_string(),
                    "movies[0].title: must not be empty".to_string(),
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
