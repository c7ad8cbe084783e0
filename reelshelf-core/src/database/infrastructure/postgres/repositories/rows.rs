//! Row decoding shared by the list and import repositories.

use reelshelf_model::{
    Book, BookFields, BookListItem, BookStatus, ListEntry, Movie, MovieFields,
    MovieListItem, MovieStatus, TopItem,
};
use sqlx::{Row, postgres::PgRow};

pub(super) const BOOK_COLUMNS: &str = "b.id, b.submitter, b.title, b.author, b.publisher, b.isbn, b.pages, b.year, \
     e.status, e.score, e.start_date, e.end_date, e.note";

pub(super) const MOVIE_COLUMNS: &str = "m.id, m.submitter, m.title, m.studio, m.director, m.writer, m.duration, m.year, \
     e.status, e.score, e.start_date, e.end_date, e.note";

pub(super) fn book_fields(row: &PgRow) -> Result<BookFields, sqlx::Error> {
    Ok(BookFields {
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        publisher: row.try_get("publisher")?,
        isbn: row.try_get("isbn")?,
        pages: row.try_get("pages")?,
        year: row.try_get("year")?,
    })
}

pub(super) fn movie_fields(row: &PgRow) -> Result<MovieFields, sqlx::Error> {
    Ok(MovieFields {
        title: row.try_get("title")?,
        studio: row.try_get("studio")?,
        director: row.try_get("director")?,
        writer: row.try_get("writer")?,
        duration: row.try_get("duration")?,
        year: row.try_get("year")?,
    })
}

fn entry<S>(row: &PgRow) -> Result<ListEntry<S>, sqlx::Error>
where
    S: std::str::FromStr<Err = reelshelf_model::ModelError>,
{
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<S>()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

    Ok(ListEntry {
        status,
        score: row.try_get("score")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        note: row.try_get("note")?,
    })
}

pub(super) fn book_list_item(row: &PgRow) -> Result<BookListItem, sqlx::Error> {
    Ok(BookListItem {
        book: Book {
            id: row.try_get("id")?,
            submitter: row.try_get("submitter")?,
            fields: book_fields(row)?,
        },
        entry: entry::<BookStatus>(row)?,
    })
}

pub(super) fn movie_list_item(row: &PgRow) -> Result<MovieListItem, sqlx::Error> {
    Ok(MovieListItem {
        movie: Movie {
            id: row.try_get("id")?,
            submitter: row.try_get("submitter")?,
            fields: movie_fields(row)?,
        },
        entry: entry::<MovieStatus>(row)?,
    })
}

pub(super) fn top_item(row: &PgRow) -> Result<TopItem, sqlx::Error> {
    Ok(TopItem {
        title: row.try_get("title")?,
        score: row.try_get("score")?,
        end_date: row.try_get("end_date")?,
    })
}
