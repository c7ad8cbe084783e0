//! Data model shared by the reelshelf core and server crates.
//!
//! Nothing in here performs I/O. Types derive serde when the `serde` feature
//! is enabled (the default), which is how they travel over the HTTP API and
//! inside profile export documents.
#![allow(missing_docs)]

pub mod api;
pub mod error;
pub mod export;
pub mod items;
pub mod list;
pub mod share;
pub mod stats;

pub use api::ApiResponse;
pub use error::{ModelError, Result as ModelResult};
pub use export::{EXPORT_VERSION, ExportDocument, ExportedBook, ExportedMovie};
pub use items::{Book, BookFields, Movie, MovieFields};
pub use list::{
    BookListItem, BookStatus, ListEntry, MovieListItem, MovieStatus, TopItem,
};
pub use share::ShareRecord;
pub use stats::{
    BookStats, MovieStats, ProfileStats, SCORE_MAX, SCORE_MIN, ScoreCount,
};
