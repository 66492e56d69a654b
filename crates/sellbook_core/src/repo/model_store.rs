//! Startup/shutdown persistence of the whole model.
//!
//! # Invariants
//! - A book that was never saved loads as empty; any other read failure
//!   aborts the load.
//! - `save_model` writes all books in one transaction.
//! - Loaded orders and schedules agree: every scheduled order references a
//!   stored schedule that points back at it.

use log::info;
use rusqlite::Connection;
use std::collections::HashMap;

use crate::model::customer::Customer;
use crate::model::order::{Order, OrderStatus};
use crate::model::phone::Phone;
use crate::model::record::Record;
use crate::model::schedule::Schedule;
use crate::repo::book_repo::{write_book, BookRepository, RepoError, RepoResult, SqliteBookRepository};
use crate::service::model_service::{ModelService, ModelSnapshot};

pub const CUSTOMER_BOOK: &str = "customers";
pub const PHONE_BOOK: &str = "phones";
pub const ORDER_BOOK: &str = "orders";
pub const SCHEDULE_BOOK: &str = "schedules";
pub const ARCHIVED_ORDER_BOOK: &str = "archived_orders";

/// Loads and saves a `ModelService` through per-book repositories.
pub struct ModelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ModelStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Repository for a single book.
    pub fn repository<T: Record>(&self, book: &'static str) -> SqliteBookRepository<'conn, T> {
        SqliteBookRepository::new(self.conn, book)
    }

    pub fn load_model(&self) -> RepoResult<ModelService> {
        let snapshot = ModelSnapshot {
            customers: load_or_empty(&self.repository::<Customer>(CUSTOMER_BOOK))?,
            phones: load_or_empty(&self.repository::<Phone>(PHONE_BOOK))?,
            orders: load_or_empty(&self.repository::<Order>(ORDER_BOOK))?,
            schedules: load_or_empty(&self.repository::<Schedule>(SCHEDULE_BOOK))?,
            archived_orders: load_or_empty(&self.repository::<Order>(ARCHIVED_ORDER_BOOK))?,
        };
        check_schedule_links(&snapshot)?;

        let model = ModelService::from_snapshot(snapshot).map_err(|err| RepoError::DataFormat {
            book: "model".to_string(),
            message: err.to_string(),
        })?;
        info!(
            "event=model_load module=repo status=ok customers={} phones={} orders={} schedules={} archived_orders={}",
            model.customers().len(),
            model.phones().len(),
            model.orders().len(),
            model.schedules().len(),
            model.archived_orders().len()
        );
        Ok(model)
    }

    pub fn save_model(&self, model: &ModelService) -> RepoResult<()> {
        let snapshot = model.snapshot();
        let tx = self.conn.unchecked_transaction()?;
        write_book(&tx, CUSTOMER_BOOK, &snapshot.customers)?;
        write_book(&tx, PHONE_BOOK, &snapshot.phones)?;
        write_book(&tx, ORDER_BOOK, &snapshot.orders)?;
        write_book(&tx, SCHEDULE_BOOK, &snapshot.schedules)?;
        write_book(&tx, ARCHIVED_ORDER_BOOK, &snapshot.archived_orders)?;
        tx.commit()?;
        info!("event=model_save module=repo status=ok");
        Ok(())
    }
}

fn load_or_empty<T, R: BookRepository<T>>(repo: &R) -> RepoResult<Vec<T>> {
    Ok(repo.load()?.unwrap_or_default())
}

fn check_schedule_links(snapshot: &ModelSnapshot) -> RepoResult<()> {
    let owners: HashMap<_, _> = snapshot
        .schedules
        .iter()
        .map(|schedule| (schedule.id(), schedule.order_id()))
        .collect();
    for order in &snapshot.orders {
        let linked = match order.schedule() {
            Some(schedule_id) => owners.get(&schedule_id) == Some(&order.id()),
            None => true,
        };
        if !linked || (order.status() == OrderStatus::Scheduled) != order.schedule().is_some() {
            return Err(RepoError::DataFormat {
                book: ORDER_BOOK.to_string(),
                message: format!("order {} has a dangling schedule reference", order.id()),
            });
        }
    }
    for schedule in &snapshot.schedules {
        let owner = snapshot
            .orders
            .iter()
            .find(|order| order.id() == schedule.order_id());
        if owner.and_then(|order| order.schedule()) != Some(schedule.id()) {
            return Err(RepoError::DataFormat {
                book: SCHEDULE_BOOK.to_string(),
                message: format!("schedule {} is not attached to its order", schedule.id()),
            });
        }
    }
    Ok(())
}
