//! Domain model for the seller's record books.
//!
//! # Responsibility
//! - Define the four entity records (customer, phone, order, schedule).
//! - Define validated field types shared by those records.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - Records are immutable values; edits produce new records.
//! - Weak identity (`Record::is_same`) compares ids only.

pub mod customer;
pub mod fields;
pub mod order;
pub mod phone;
pub mod record;
pub mod schedule;
