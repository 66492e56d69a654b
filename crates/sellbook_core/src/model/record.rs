//! Shared record contract used by the generic record book.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

use crate::model::fields::ValidationError;

/// Entity category, used for error messages, logging and storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Customer,
    Phone,
    Order,
    Schedule,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Phone => "phone",
            Self::Order => "order",
            Self::Schedule => "schedule",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value record stored in a `RecordBook`.
///
/// # Invariants
/// - `id()` is the record's only identity field; two records with equal ids
///   are "the same" even when their data fields differ.
pub trait Record: Clone + PartialEq + Debug + Serialize + DeserializeOwned {
    const KIND: RecordKind;

    fn id(&self) -> Uuid;

    /// Weak identity: equality of the identity field only.
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Checks cross-field constraints not covered by field types.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.id().is_nil() {
            return Err(ValidationError::NilId(Self::KIND));
        }
        Ok(())
    }
}
