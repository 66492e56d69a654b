//! Live read-only projections over a record book.

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::record::Record;

/// Filter applied by a view; `show_all()` is the default.
pub type RecordPredicate<T> = Rc<dyn Fn(&T) -> bool>;

/// Predicate that keeps every record.
pub fn show_all<T>() -> RecordPredicate<T> {
    Rc::new(|_| true)
}

/// Ordered, filtered, read-only window onto a book's storage.
///
/// Cloning a view yields another handle to the same projection, including
/// its current predicate.
pub struct BookView<T: Record> {
    source: Rc<RefCell<Vec<T>>>,
    predicate: Rc<RefCell<RecordPredicate<T>>>,
}

impl<T: Record> BookView<T> {
    pub(crate) fn new(source: Rc<RefCell<Vec<T>>>, predicate: RecordPredicate<T>) -> Self {
        Self {
            source,
            predicate: Rc::new(RefCell::new(predicate)),
        }
    }

    /// Records currently visible, in book order.
    pub fn items(&self) -> Vec<T> {
        let predicate = Rc::clone(&self.predicate.borrow());
        self.source
            .borrow()
            .iter()
            .filter(|record| predicate(*record))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        let predicate = Rc::clone(&self.predicate.borrow());
        self.source
            .borrow()
            .iter()
            .filter(|record| predicate(*record))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible record at zero-based `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        let predicate = Rc::clone(&self.predicate.borrow());
        self.source
            .borrow()
            .iter()
            .filter(|record| predicate(*record))
            .nth(index)
            .cloned()
    }

    /// Changes which records this projection shows.
    pub(crate) fn set_predicate(&self, predicate: RecordPredicate<T>) {
        *self.predicate.borrow_mut() = predicate;
    }
}

impl<T: Record> Clone for BookView<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            predicate: Rc::clone(&self.predicate),
        }
    }
}
