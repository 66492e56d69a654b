//! Change journal returned by model mutations.
//!
//! Every mutating `ModelService` call reports what it touched, in order.
//! Reverting the journal back-to-front restores the prior state exactly,
//! positions included.

use crate::book::{BookError, Positioned, RecordBook};
use crate::model::customer::Customer;
use crate::model::order::Order;
use crate::model::phone::Phone;
use crate::model::record::Record;
use crate::model::schedule::Schedule;

/// One primitive change against a single book.
#[derive(Debug, Clone, PartialEq)]
pub enum BookChange<T> {
    Added(T),
    /// Removed entries in ascending original position.
    Removed(Vec<Positioned<T>>),
    /// `previous` was replaced by `current`, possibly with another identity.
    Replaced { previous: Positioned<T>, current: T },
    /// Previous versions of entries rewritten in place with the same identity.
    Rewritten(Vec<Positioned<T>>),
    Cleared(Vec<T>),
}

impl<T: Record> BookChange<T> {
    fn revert(&self, book: &mut RecordBook<T>) -> Result<(), BookError> {
        match self {
            Self::Added(record) => {
                book.remove(record)?;
            }
            Self::Removed(entries) => {
                for entry in entries {
                    book.insert_at(entry.index, entry.record.clone())?;
                }
            }
            Self::Replaced { previous, current } => {
                book.replace(current, previous.record.clone())?;
            }
            Self::Rewritten(entries) => {
                for entry in entries {
                    book.replace(&entry.record, entry.record.clone())?;
                }
            }
            Self::Cleared(records) => {
                book.set_records(records.clone())?;
            }
        }
        Ok(())
    }

    fn touched(&self) -> usize {
        match self {
            Self::Added(_) | Self::Replaced { .. } => 1,
            Self::Removed(entries) | Self::Rewritten(entries) => entries.len(),
            Self::Cleared(records) => records.len(),
        }
    }
}

/// A change tagged with the book it applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Customer(BookChange<Customer>),
    Phone(BookChange<Phone>),
    Order(BookChange<Order>),
    Schedule(BookChange<Schedule>),
    ArchivedOrder(BookChange<Order>),
}

/// Ordered journal of the changes made by one model operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, change: Change) -> &mut Self {
        self.changes.push(change);
        self
    }

    /// Appends `other` after the changes already recorded.
    pub(crate) fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of orders removed by this change set, cascades included.
    pub fn removed_orders(&self) -> usize {
        self.changes
            .iter()
            .map(|change| match change {
                Change::Order(BookChange::Removed(entries)) => entries.len(),
                Change::Order(BookChange::Cleared(records)) => records.len(),
                _ => 0,
            })
            .sum()
    }

    /// Total number of records touched.
    pub fn touched(&self) -> usize {
        self.changes
            .iter()
            .map(|change| match change {
                Change::Customer(c) => c.touched(),
                Change::Phone(c) => c.touched(),
                Change::Order(c) | Change::ArchivedOrder(c) => c.touched(),
                Change::Schedule(c) => c.touched(),
            })
            .sum()
    }
}

/// Mutable access to every book, in the order changes are reverted against.
pub(crate) struct Books<'a> {
    pub customers: &'a mut RecordBook<Customer>,
    pub phones: &'a mut RecordBook<Phone>,
    pub orders: &'a mut RecordBook<Order>,
    pub schedules: &'a mut RecordBook<Schedule>,
    pub archived_orders: &'a mut RecordBook<Order>,
}

impl Books<'_> {
    /// Undoes `changes` back-to-front.
    pub(crate) fn revert(&mut self, changes: &ChangeSet) -> Result<(), BookError> {
        for change in changes.changes.iter().rev() {
            match change {
                Change::Customer(c) => c.revert(self.customers)?,
                Change::Phone(c) => c.revert(self.phones)?,
                Change::Order(c) => c.revert(self.orders)?,
                Change::Schedule(c) => c.revert(self.schedules)?,
                Change::ArchivedOrder(c) => c.revert(self.archived_orders)?,
            }
        }
        Ok(())
    }
}
