//! Core domain logic for SellBook.
//! This crate is the single source of truth for record-book invariants:
//! uniqueness, cross-entity cascades, schedule conflicts and undo/redo.

pub mod book;
pub mod command;
pub mod config;
pub mod conflict;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use book::{show_all, BookError, BookView, RecordBook, RecordPredicate};
pub use command::{
    Command, CommandAction, CommandError, CommandHistory, CommandOutcome, CommandResult, Index,
    Panel, Session, UndoRedoStack,
};
pub use config::{ConfigError, CoreConfig};
pub use conflict::{conflicts_with, find_conflicts, MinuteSpan};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::customer::{Customer, CustomerChanges, CustomerId};
pub use model::fields::ValidationError;
pub use model::order::{Order, OrderChanges, OrderId, OrderStatus};
pub use model::phone::{Phone, PhoneChanges, PhoneId};
pub use model::record::{Record, RecordKind};
pub use model::schedule::{Schedule, ScheduleChanges, ScheduleId};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::model_store::ModelStore;
pub use service::change::ChangeSet;
pub use service::model_service::{ModelError, ModelResult, ModelService, ModelSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
