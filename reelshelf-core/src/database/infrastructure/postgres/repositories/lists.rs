use async_trait::async_trait;
use reelshelf_model::{
    Book, BookFields, BookListItem, BookStatus, ListEntry, Movie, MovieFields,
    MovieListItem, MovieStatus, TopItem,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::rows::{
    BOOK_COLUMNS, MOVIE_COLUMNS, book_list_item, movie_list_item, top_item,
};
use crate::{
    database::ports::lists::ListsRepository,
    error::{CoreError, Result},
};

#[derive(Clone, Debug)]
pub struct PostgresListsRepository {
    pool: PgPool,
}

impl PostgresListsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// CHECK violations mean the caller sent an out-of-range value; anything else
/// is ours.
fn write_error(context: &str, err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err
        && db.is_check_violation()
    {
        return CoreError::validation(format!(
            "{context}: value out of range ({})",
            db.constraint().unwrap_or("constraint")
        ));
    }
    CoreError::Internal(format!("Failed to {context}: {err}"))
}

#[async_trait]
impl ListsRepository for PostgresListsRepository {
    async fn add_book(
        &self,
        username: &str,
        fields: &BookFields,
        entry: &ListEntry<BookStatus>,
    ) -> Result<BookListItem> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Internal(format!("Failed to start transaction: {e}"))
        })?;

        let id: Uuid = sqlx::query(
            r#"
            INSERT INTO books (submitter, title, author, publisher, isbn, pages, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.publisher)
        .bind(&fields.isbn)
        .bind(fields.pages)
        .bind(fields.year)
        .fetch_one(&mut *tx)
        .await
        .and_then(|row| row.try_get("id"))
        .map_err(|e| write_error("insert book", e))?;

        sqlx::query(
            r#"
            INSERT INTO book_list_entries
                (book_id, username, status, score, start_date, end_date, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(entry.status.as_str())
        .bind(entry.score)
        .bind(entry.start_date)
        .bind(entry.end_date)
        .bind(&entry.note)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("insert book list entry", e))?;

        tx.commit().await.map_err(|e| {
            CoreError::Internal(format!("Failed to commit book: {e}"))
        })?;

        Ok(BookListItem {
            book: Book {
                id,
                submitter: username.to_string(),
                fields: fields.clone(),
            },
            entry: entry.clone(),
        })
    }

    async fn add_movie(
        &self,
        username: &str,
        fields: &MovieFields,
        entry: &ListEntry<MovieStatus>,
    ) -> Result<MovieListItem> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Internal(format!("Failed to start transaction: {e}"))
        })?;

        let id: Uuid = sqlx::query(
            r#"
            INSERT INTO movies (submitter, title, studio, director, writer, duration, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(&fields.title)
        .bind(&fields.studio)
        .bind(&fields.director)
        .bind(&fields.writer)
        .bind(fields.duration)
        .bind(fields.year)
        .fetch_one(&mut *tx)
        .await
        .and_then(|row| row.try_get("id"))
        .map_err(|e| write_error("insert movie", e))?;

        sqlx::query(
            r#"
            INSERT INTO movie_list_entries
                (movie_id, username, status, score, start_date, end_date, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(entry.status.as_str())
        .bind(entry.score)
        .bind(entry.start_date)
        .bind(entry.end_date)
        .bind(&entry.note)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("insert movie list entry", e))?;

        tx.commit().await.map_err(|e| {
            CoreError::Internal(format!("Failed to commit movie: {e}"))
        })?;

        Ok(MovieListItem {
            movie: Movie {
                id,
                submitter: username.to_string(),
                fields: fields.clone(),
            },
            entry: entry.clone(),
        })
    }

    async fn list_books(&self, username: &str) -> Result<Vec<BookListItem>> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM book_list_entries e \
             JOIN books b ON b.id = e.book_id \
             WHERE e.username = $1 \
             ORDER BY b.created_at DESC, b.id"
        );
        let rows = sqlx::query(&query)
            .bind(username)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to list books: {e}"))
            })?;

        rows.iter()
            .map(book_list_item)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode book: {e}")))
    }

    async fn list_movies(&self, username: &str) -> Result<Vec<MovieListItem>> {
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movie_list_entries e \
             JOIN movies m ON m.id = e.movie_id \
             WHERE e.username = $1 \
             ORDER BY m.created_at DESC, m.id"
        );
        let rows = sqlx::query(&query)
            .bind(username)
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Failed to list movies: {e}"))
            })?;

        rows.iter()
            .map(movie_list_item)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode movie: {e}")))
    }

    async fn top_completed_books(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<TopItem>> {
        let rows = sqlx::query(
            r#"
            SELECT b.title, e.score, e.end_date
            FROM book_list_entries e
            JOIN books b ON b.id = e.book_id
            WHERE e.username = $1
              AND e.status = 'completed'
              AND e.score IS NOT NULL
            ORDER BY e.score DESC, e.end_date DESC NULLS LAST, b.title
            LIMIT $2
            "#,
        )
        .bind(username)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to load top books: {e}"))
        })?;

        rows.iter()
            .map(top_item)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode book: {e}")))
    }

    async fn top_completed_movies(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<TopItem>> {
        let rows = sqlx::query(
            r#"
            SELECT m.title, e.score, e.end_date
            FROM movie_list_entries e
            JOIN movies m ON m.id = e.movie_id
            WHERE e.username = $1
              AND e.status = 'completed'
              AND e.score IS NOT NULL
            ORDER BY e.score DESC, e.end_date DESC NULLS LAST, m.title
            LIMIT $2
            "#,
        )
        .bind(username)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to load top movies: {e}"))
        })?;

        rows.iter()
            .map(top_item)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Internal(format!("Failed to decode movie: {e}")))
    }
}
