//! Transactional profile import.
//!
//! Each item type is bulk inserted with `RETURNING`. PostgreSQL does not
//! document that `RETURNING` rows follow the order of a multi-row `VALUES`
//! list, so the returned descriptive columns are re-hashed and matched to
//! their list entries through the plan's content-hash map.

use async_trait::async_trait;
use reelshelf_model::{BookStatus, ListEntry, MovieStatus};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error};
use uuid::Uuid;

use super::rows::{book_fields, movie_fields};
use crate::{
    database::ports::imports::ImportRepository,
    error::{CoreError, Result},
    transfer::{ImportPlan, ImportSummary},
};

/// Rows per statement, keeping every statement under the 65535 bind limit.
const INSERT_CHUNK: usize = 1000;

#[derive(Clone, Debug)]
pub struct PostgresImportRepository {
    pool: PgPool,
}

impl PostgresImportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn run(&self, plan: &ImportPlan) -> std::result::Result<ImportSummary, String> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| format!("begin transaction: {e}"))?;

        let books = insert_books(&mut tx, plan).await?;
        let movies = insert_movies(&mut tx, plan).await?;

        tx.commit().await.map_err(|e| format!("commit: {e}"))?;
        Ok(ImportSummary { books, movies })
    }
}

#[async_trait]
impl ImportRepository for PostgresImportRepository {
    async fn import_profile(&self, plan: &ImportPlan) -> Result<ImportSummary> {
        // Dropping the transaction on error rolls everything back.
        self.run(plan).await.map_err(|reason| {
            error!(
                username = %plan.username,
                books = plan.books.len(),
                movies = plan.movies.len(),
                %reason,
                "profile import rolled back"
            );
            CoreError::ImportFailed
        })
    }
}

async fn insert_books(
    tx: &mut Transaction<'_, Postgres>,
    plan: &ImportPlan,
) -> std::result::Result<usize, String> {
    let mut inserted = 0;

    for chunk in plan.books.chunks(INSERT_CHUNK) {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO books (submitter, title, author, publisher, isbn, pages, year) ",
        );
        qb.push_values(chunk, |mut row, book| {
            row.push_bind(plan.username.clone())
                .push_bind(book.title.clone())
                .push_bind(book.author.clone())
                .push_bind(book.publisher.clone())
                .push_bind(book.isbn.clone())
                .push_bind(book.pages)
                .push_bind(book.year);
        });
        qb.push(" RETURNING id, title, author, publisher, isbn, pages, year");

        let rows = qb
            .build()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| format!("insert books: {e}"))?;

        let mut entries: Vec<(Uuid, &ListEntry<BookStatus>)> =
            Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = sqlx::Row::try_get(row, "id")
                .map_err(|e| format!("decode book id: {e}"))?;
            let fields =
                book_fields(row).map_err(|e| format!("decode book: {e}"))?;
            let entry = plan.book_entry(&fields).ok_or_else(|| {
                format!("no list entry matches inserted book {id}")
            })?;
            entries.push((id, entry));
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO book_list_entries \
             (book_id, username, status, score, start_date, end_date, note) ",
        );
        qb.push_values(entries, |mut row, (id, entry)| {
            row.push_bind(id)
                .push_bind(plan.username.clone())
                .push_bind(entry.status.as_str())
                .push_bind(entry.score)
                .push_bind(entry.start_date)
                .push_bind(entry.end_date)
                .push_bind(entry.note.clone());
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .map_err(|e| format!("insert book list entries: {e}"))?;

        inserted += rows.len();
        debug!(username = %plan.username, rows = rows.len(), "imported book chunk");
    }

    Ok(inserted)
}

async fn insert_movies(
    tx: &mut Transaction<'_, Postgres>,
    plan: &ImportPlan,
) -> std::result::Result<usize, String> {
    let mut inserted = 0;

    for chunk in plan.movies.chunks(INSERT_CHUNK) {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO movies (submitter, title, studio, director, writer, duration, year) ",
        );
        qb.push_values(chunk, |mut row, movie| {
            row.push_bind(plan.username.clone())
                .push_bind(movie.title.clone())
                .push_bind(movie.studio.clone())
                .push_bind(movie.director.clone())
                .push_bind(movie.writer.clone())
                .push_bind(movie.duration)
                .push_bind(movie.year);
        });
        qb.push(" RETURNING id, title, studio, director, writer, duration, year");

        let rows = qb
            .build()
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| format!("insert movies: {e}"))?;

        let mut entries: Vec<(Uuid, &ListEntry<MovieStatus>)> =
            Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = sqlx::Row::try_get(row, "id")
                .map_err(|e| format!("decode movie id: {e}"))?;
            let fields =
                movie_fields(row).map_err(|e| format!("decode movie: {e}"))?;
            let entry = plan.movie_entry(&fields).ok_or_else(|| {
                format!("no list entry matches inserted movie {id}")
            })?;
            entries.push((id, entry));
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO movie_list_entries \
             (movie_id, username, status, score, start_date, end_date, note) ",
        );
        qb.push_values(entries, |mut row, (id, entry)| {
            row.push_bind(id)
                .push_bind(plan.username.clone())
                .push_bind(entry.status.as_str())
                .push_bind(entry.score)
                .push_bind(entry.start_date)
                .push_bind(entry.end_date)
                .push_bind(entry.note.clone());
        });
        qb.build()
            .execute(&mut **tx)
            .await
            .map_err(|e| format!("insert movie list entries: {e}"))?;

        inserted += rows.len();
        debug!(username = %plan.username, rows = rows.len(), "imported movie chunk");
    }

    Ok(inserted)
}
