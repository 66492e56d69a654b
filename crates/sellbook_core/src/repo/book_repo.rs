//! Record book persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Save a whole book in one transaction and load it back in order.
//! - Distinguish "never saved" from "saved but unreadable".
//!
//! # Invariants
//! - Write paths call `Record::validate()` and reject duplicate identities
//!   before touching SQL.
//! - Read paths reject invalid persisted state instead of masking it:
//!   position gaps, count mismatch, uuid column vs payload id mismatch,
//!   duplicate identities and field constraint violations all surface as
//!   `RepoError::DataFormat`.

use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::book::ensure_unique;
use crate::db::DbError;
use crate::model::fields::ValidationError;
use crate::model::record::Record;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for record books.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored data cannot be turned back into a valid book.
    DataFormat { book: String, message: String },
    /// A record could not be encoded for storage.
    Json(serde_json::Error),
    /// A record to be saved violates its own constraints.
    Validation(ValidationError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DataFormat { book, message } => {
                write!(f, "invalid persisted data in book `{book}`: {message}")
            }
            Self::Json(err) => write!(f, "failed to encode record: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::DataFormat { .. } => None,
            Self::Json(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Storage of one record book.
pub trait BookRepository<T> {
    /// Returns `None` when the book was never saved.
    fn load(&self) -> RepoResult<Option<Vec<T>>>;
    /// Replaces the stored book with `records`, in order.
    fn save(&self, records: &[T]) -> RepoResult<()>;
}

/// SQLite-backed book repository keyed by book name.
pub struct SqliteBookRepository<'conn, T> {
    conn: &'conn Connection,
    book: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<'conn, T> SqliteBookRepository<'conn, T> {
    /// `conn` must come from `db::open_db*` so migrations are applied.
    pub fn new(conn: &'conn Connection, book: &'static str) -> Self {
        Self {
            conn,
            book,
            _records: PhantomData,
        }
    }

    pub fn book(&self) -> &'static str {
        self.book
    }
}

impl<T: Record> BookRepository<T> for SqliteBookRepository<'_, T> {
    fn load(&self) -> RepoResult<Option<Vec<T>>> {
        read_book(self.conn, self.book)
    }

    fn save(&self, records: &[T]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        write_book(&tx, self.book, records)?;
        tx.commit()?;
        Ok(())
    }
}

/// Reads `book` from `conn`; `None` when no header row exists.
fn read_book<T: Record>(conn: &Connection, book: &str) -> RepoResult<Option<Vec<T>>> {
    let expected: Option<i64> = conn
        .query_row(
            "SELECT record_count FROM books WHERE name = ?1;",
            [book],
            |row| row.get(0),
        )
        .optional()?;
    let Some(expected) = expected else {
        debug!("event=book_load module=repo status=missing book={book}");
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT position, uuid, payload
         FROM book_records
         WHERE book = ?1
         ORDER BY position ASC;",
    )?;
    let rows = stmt.query_map([book], |row| {
        Ok((
            row.get::<_, i64>("position")?,
            row.get::<_, String>("uuid")?,
            row.get::<_, String>("payload")?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (position, uuid_text, payload) = row?;
        records.push(parse_record_row::<T>(book, records.len(), position, &uuid_text, &payload)?);
    }

    if i64::try_from(records.len()).ok() != Some(expected) {
        return Err(data_format(
            book,
            format!("header expects {expected} records, found {}", records.len()),
        ));
    }
    ensure_unique(&records).map_err(|err| data_format(book, err.to_string()))?;

    info!(
        "event=book_load module=repo status=ok book={book} records={}",
        records.len()
    );
    Ok(Some(records))
}

/// Replaces `book` inside the caller's transaction.
pub(crate) fn write_book<T: Record>(conn: &Connection, book: &str, records: &[T]) -> RepoResult<()> {
    for record in records {
        record.validate()?;
    }
    ensure_unique(records).map_err(|err| {
        warn!("event=book_save module=repo status=error book={book} error_code=duplicate_identity");
        data_format(book, err.to_string())
    })?;

    conn.execute("DELETE FROM book_records WHERE book = ?1;", [book])?;
    conn.execute(
        "INSERT INTO books (name, record_count, saved_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(name) DO UPDATE SET
            record_count = excluded.record_count,
            saved_at = excluded.saved_at;",
        params![book, records.len() as i64],
    )?;

    let mut insert = conn.prepare(
        "INSERT INTO book_records (book, position, uuid, payload)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, record) in records.iter().enumerate() {
        let payload = serde_json::to_string(record)?;
        insert.execute(params![
            book,
            position as i64,
            record.id().to_string(),
            payload
        ])?;
    }

    info!(
        "event=book_save module=repo status=ok book={book} records={}",
        records.len()
    );
    Ok(())
}

fn parse_record_row<T: Record>(
    book: &str,
    expected_position: usize,
    position: i64,
    uuid_text: &str,
    payload: &str,
) -> RepoResult<T> {
    if i64::try_from(expected_position).ok() != Some(position) {
        return Err(data_format(
            book,
            format!("expected position {expected_position}, found {position}"),
        ));
    }
    let uuid = Uuid::parse_str(uuid_text).map_err(|_| {
        data_format(
            book,
            format!("invalid uuid value `{uuid_text}` in book_records.uuid"),
        )
    })?;
    let record: T = serde_json::from_str(payload)
        .map_err(|err| data_format(book, format!("row {position}: {err}")))?;
    if record.id() != uuid {
        return Err(data_format(
            book,
            format!("row {position}: payload id {} does not match uuid column {uuid}", record.id()),
        ));
    }
    record
        .validate()
        .map_err(|err| data_format(book, format!("row {position}: {err}")))?;
    Ok(record)
}

fn data_format(book: &str, message: String) -> RepoError {
    RepoError::DataFormat {
        book: book.to_string(),
        message,
    }
}
