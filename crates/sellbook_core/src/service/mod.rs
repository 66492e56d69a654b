//! Core use-case services.
//!
//! # Responsibility
//! - Coordinate the record books into one consistent model.
//! - Report mutations as revertible change journals.
//!
//! # See also
//! - `crate::command` for the user-facing operations built on top.

pub mod change;
pub mod model_service;
