//! Customer record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::fields::{ContactNumber, Email, Name, Tag, ValidationError};
use crate::model::record::{Record, RecordKind};

pub type CustomerId = Uuid;

/// A buyer known to the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    name: Name,
    contact_number: ContactNumber,
    email: Email,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

impl Customer {
    /// Creates a customer with a generated id.
    pub fn new(
        name: Name,
        contact_number: ContactNumber,
        email: Email,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact_number,
            email,
            tags: tags.into_iter().collect(),
        }
    }

    /// Creates a customer with a caller-provided id.
    pub fn with_id(
        id: CustomerId,
        name: Name,
        contact_number: ContactNumber,
        email: Email,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<Self, ValidationError> {
        let customer = Self {
            id,
            name,
            contact_number,
            email,
            tags: tags.into_iter().collect(),
        };
        customer.validate()?;
        Ok(customer)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn contact_number(&self) -> &ContactNumber {
        &self.contact_number
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }
}

impl Record for Customer {
    const KIND: RecordKind = RecordKind::Customer;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Contact: {} Email: {}",
            self.name, self.contact_number, self.email
        )
    }
}

/// Field replacements for an edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerChanges {
    pub name: Option<Name>,
    pub contact_number: Option<ContactNumber>,
    pub email: Option<Email>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl CustomerChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_number.is_none()
            && self.email.is_none()
            && self.tags.is_none()
    }

    /// Builds the edited record; identity is carried over from `customer`.
    pub fn apply(&self, customer: &Customer) -> Customer {
        Customer {
            id: customer.id,
            name: self.name.clone().unwrap_or_else(|| customer.name.clone()),
            contact_number: self
                .contact_number
                .clone()
                .unwrap_or_else(|| customer.contact_number.clone()),
            email: self.email.clone().unwrap_or_else(|| customer.email.clone()),
            tags: self.tags.clone().unwrap_or_else(|| customer.tags.clone()),
        }
    }
}
