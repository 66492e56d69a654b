//! Generic uniqueness-enforcing record collection.
//!
//! # Responsibility
//! - Store one entity type in insertion order.
//! - Reject identity collisions on add/replace and unknown targets on
//!   remove/replace.
//! - Hand out live read-only projections to rendering code.
//!
//! # Invariants
//! - No two entries satisfy `Record::is_same`.
//! - A failing operation leaves the book unchanged.
//! - Views share storage with the book, so they observe later mutations
//!   without being re-fetched; they expose no mutating API.

mod view;

pub use view::{show_all, BookView, RecordPredicate};

use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

use crate::model::record::{Record, RecordKind};

/// Identity-level failure of a book operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// An entry with the same identity is already stored.
    DuplicateIdentity { kind: RecordKind, id: Uuid },
    /// No entry with this identity is stored.
    IdentityNotFound { kind: RecordKind, id: Uuid },
}

impl Display for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateIdentity { kind, id } => write!(f, "duplicate {kind}: {id}"),
            Self::IdentityNotFound { kind, id } => write!(f, "{kind} not found: {id}"),
        }
    }
}

impl Error for BookError {}

/// A record together with the position it occupied in its book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positioned<T> {
    pub index: usize,
    pub record: T,
}

/// Ordered collection of records with unique identities.
pub struct RecordBook<T: Record> {
    records: Rc<RefCell<Vec<T>>>,
}

impl<T: Record> RecordBook<T> {
    pub fn new() -> Self {
        Self {
            records: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Builds a book from `records`, rejecting identity collisions.
    pub fn try_from_records(records: Vec<T>) -> Result<Self, BookError> {
        ensure_unique(&records)?;
        Ok(Self {
            records: Rc::new(RefCell::new(records)),
        })
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Weak-identity membership test.
    pub fn contains(&self, item: &T) -> bool {
        self.position(item.id()).is_some()
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.records
            .borrow()
            .iter()
            .position(|record| record.id() == id)
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.records
            .borrow()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    /// Ordered copy of all records.
    pub fn records(&self) -> Vec<T> {
        self.records.borrow().clone()
    }

    pub fn add(&mut self, item: T) -> Result<(), BookError> {
        if self.contains(&item) {
            return Err(duplicate(&item));
        }
        self.records.borrow_mut().push(item);
        Ok(())
    }

    /// Removes the entry that is the same as `item` and returns it with
    /// its former position.
    pub fn remove(&mut self, item: &T) -> Result<Positioned<T>, BookError> {
        let index = self.position(item.id()).ok_or_else(|| not_found(item))?;
        let record = self.records.borrow_mut().remove(index);
        Ok(Positioned { index, record })
    }

    /// Substitutes `edited` for `target` in place and returns the previous
    /// entry.
    pub fn replace(&mut self, target: &T, edited: T) -> Result<Positioned<T>, BookError> {
        let index = self.position(target.id()).ok_or_else(|| not_found(target))?;
        if !target.is_same(&edited) && self.contains(&edited) {
            return Err(duplicate(&edited));
        }
        let record = std::mem::replace(&mut self.records.borrow_mut()[index], edited);
        Ok(Positioned { index, record })
    }

    /// Inserts `item` at `index` (clamped to the current length).
    pub fn insert_at(&mut self, index: usize, item: T) -> Result<(), BookError> {
        if self.contains(&item) {
            return Err(duplicate(&item));
        }
        let mut records = self.records.borrow_mut();
        let index = index.min(records.len());
        records.insert(index, item);
        Ok(())
    }

    /// Removes every entry matching `predicate`.
    ///
    /// Returned entries are in ascending original position, so re-inserting
    /// them in order restores the book exactly.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> Vec<Positioned<T>> {
        let mut records = self.records.borrow_mut();
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(records.len());
        for (index, record) in records.drain(..).enumerate() {
            if predicate(&record) {
                removed.push(Positioned { index, record });
            } else {
                kept.push(record);
            }
        }
        *records = kept;
        removed
    }

    /// Rewrites every entry matching `predicate` in place, keeping identity.
    ///
    /// Returns the previous entries with their positions.
    pub(crate) fn rewrite_where(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        rewrite: impl Fn(&T) -> T,
    ) -> Vec<Positioned<T>> {
        let mut records = self.records.borrow_mut();
        let mut previous = Vec::new();
        for (index, slot) in records.iter_mut().enumerate() {
            if predicate(&*slot) {
                let rewritten = rewrite(&*slot);
                debug_assert!(slot.is_same(&rewritten), "rewrite must keep identity");
                previous.push(Positioned {
                    index,
                    record: std::mem::replace(slot, rewritten),
                });
            }
        }
        previous
    }

    /// Empties the book and returns its former contents.
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut *self.records.borrow_mut())
    }

    /// Replaces the whole contents, rejecting identity collisions.
    pub fn set_records(&mut self, records: Vec<T>) -> Result<Vec<T>, BookError> {
        ensure_unique(&records)?;
        Ok(std::mem::replace(&mut *self.records.borrow_mut(), records))
    }

    /// Live view over every record.
    pub fn view(&self) -> BookView<T> {
        BookView::new(Rc::clone(&self.records), show_all())
    }

    /// Live view over records matching `predicate`.
    pub fn filtered(&self, predicate: RecordPredicate<T>) -> BookView<T> {
        BookView::new(Rc::clone(&self.records), predicate)
    }
}

impl<T: Record> Default for RecordBook<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy: the clone does not share storage or views with `self`.
impl<T: Record> Clone for RecordBook<T> {
    fn clone(&self) -> Self {
        Self {
            records: Rc::new(RefCell::new(self.records())),
        }
    }
}

impl<T: Record> PartialEq for RecordBook<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.records.borrow() == *other.records.borrow()
    }
}

impl<T: Record> Debug for RecordBook<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.records.borrow().iter()).finish()
    }
}

pub(crate) fn ensure_unique<T: Record>(records: &[T]) -> Result<(), BookError> {
    for (index, record) in records.iter().enumerate() {
        if records[..index].iter().any(|earlier| earlier.is_same(record)) {
            return Err(duplicate(record));
        }
    }
    Ok(())
}

fn duplicate<T: Record>(item: &T) -> BookError {
    BookError::DuplicateIdentity {
        kind: T::KIND,
        id: item.id(),
    }
}

fn not_found<T: Record>(item: &T) -> BookError {
    BookError::IdentityNotFound {
        kind: T::KIND,
        id: item.id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::customer::Customer;
    use crate::model::fields::{ContactNumber, Email, Name};
    use std::rc::Rc;

    fn customer(name: &str) -> Customer {
        Customer::new(
            Name::parse(name).unwrap(),
            ContactNumber::parse("91234567").unwrap(),
            Email::parse("someone@example.com").unwrap(),
            [],
        )
    }

    fn renamed(original: &Customer, name: &str) -> Customer {
        crate::model::customer::CustomerChanges {
            name: Some(Name::parse(name).unwrap()),
            ..Default::default()
        }
        .apply(original)
    }

    #[test]
    fn add_rejects_same_identity_even_with_different_data() {
        let mut book = RecordBook::new();
        let alice = customer("Alice");
        book.add(alice.clone()).unwrap();

        let err = book.add(renamed(&alice, "Alicia")).unwrap_err();
        assert_eq!(
            err,
            BookError::DuplicateIdentity {
                kind: RecordKind::Customer,
                id: alice.id()
            }
        );
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn remove_matches_by_identity() {
        let mut book = RecordBook::new();
        let alice = customer("Alice");
        let bob = customer("Bob");
        book.add(alice.clone()).unwrap();
        book.add(bob.clone()).unwrap();

        let removed = book.remove(&renamed(&alice, "Someone Else")).unwrap();
        assert_eq!(removed.index, 0);
        assert_eq!(removed.record, alice);
        assert_eq!(book.records(), vec![bob]);

        assert!(matches!(
            book.remove(&alice),
            Err(BookError::IdentityNotFound { .. })
        ));
    }

    #[test]
    fn replace_keeps_position_and_rejects_collisions() {
        let mut book = RecordBook::new();
        let alice = customer("Alice");
        let bob = customer("Bob");
        let carl = customer("Carl");
        book.add(alice.clone()).unwrap();
        book.add(bob.clone()).unwrap();

        let edited = renamed(&alice, "Alicia");
        book.replace(&alice, edited.clone()).unwrap();
        assert_eq!(book.records()[0], edited);

        assert!(matches!(
            book.replace(&edited, bob.clone()),
            Err(BookError::DuplicateIdentity { .. })
        ));
        assert!(matches!(
            book.replace(&carl, customer("Dan")),
            Err(BookError::IdentityNotFound { .. })
        ));
        assert_eq!(book.records(), vec![edited, bob]);
    }

    #[test]
    fn views_are_live_and_filtered() {
        let mut book = RecordBook::new();
        let view = book.view();
        let only_b = book.filtered(Rc::new(|c: &Customer| c.name().as_str().starts_with('B')));
        assert!(view.is_empty());

        book.add(customer("Alice")).unwrap();
        book.add(customer("Bob")).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b.get(0).unwrap().name().as_str(), "Bob");

        book.clear();
        assert!(view.is_empty());
        assert!(only_b.is_empty());
    }

    #[test]
    fn remove_where_then_reinsert_restores_order() {
        let names = ["A", "B", "C", "D", "E"];
        let mut book = RecordBook::try_from_records(names.iter().map(|n| customer(n)).collect()).unwrap();
        let before = book.records();

        let removed = book.remove_where(|c| matches!(c.name().as_str(), "B" | "D" | "E"));
        assert_eq!(removed.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1, 3, 4]);
        for entry in removed {
            book.insert_at(entry.index, entry.record).unwrap();
        }
        assert_eq!(book.records(), before);
    }

    #[test]
    fn clone_does_not_share_storage() {
        let mut book = RecordBook::new();
        book.add(customer("Alice")).unwrap();
        let copy = book.clone();
        book.clear();
        assert_eq!(copy.len(), 1);
        assert_ne!(copy, book);
    }

    #[test]
    fn try_from_records_rejects_duplicates() {
        let alice = customer("Alice");
        let err = RecordBook::try_from_records(vec![alice.clone(), renamed(&alice, "Twin")]).unwrap_err();
        assert!(matches!(err, BookError::DuplicateIdentity { .. }));
    }
}
