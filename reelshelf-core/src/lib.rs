//! # reelshelf-core
//!
//! Domain logic and persistence for the reelshelf book and movie tracker.
//!
//! - [`share`]: share-card layout, PNG rendering and the share-link flow
//! - [`transfer`]: profile export and transactional import
//! - [`stats`]: profile aggregates and the dense score distribution
//! - [`hashing`]: content hashes that correlate imported rows to their
//!   list-entry metadata
//! - [`auth`]: accounts, sessions and the user-status cache
//! - [`database`]: repository ports and their PostgreSQL adapters
//!
//! ## Feature flags
//!
//! - `test-support`: in-memory repositories, blob store, glyph rasterizer
//!   and a manual clock.
#![allow(missing_docs)]

pub mod application;
pub mod auth;
pub mod clock;
pub mod database;
pub mod error;
pub mod hashing;
pub mod share;
pub mod stats;
pub mod storage;
pub mod transfer;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{CoreError, Result};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
