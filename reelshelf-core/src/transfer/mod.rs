//! Profile export and import.
//!
//! Export gathers a user's lists, aggregates and share records into one
//! versioned [`ExportDocument`](reelshelf_model::ExportDocument). Import
//! validates such a document into an [`ImportPlan`] and hands it to the
//! [`ImportRepository`](crate::database::ports::imports::ImportRepository),
//! which writes everything in a single transaction.

pub mod export;
pub mod import;

pub use export::ProfileTransferService;
pub use import::{ImportPlan, ImportSummary};
