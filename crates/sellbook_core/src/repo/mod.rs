//! Persistence of record books.
//!
//! # Responsibility
//! - Define the per-book storage contract used at startup and shutdown.
//! - Keep SQLite and JSON payload details out of the model.
//!
//! # Invariants
//! - Repository writes enforce `Record::validate()` before persistence.
//! - Only a never-saved book falls back to empty; corrupt data is an error.

pub mod book_repo;
pub mod model_store;
