//! Phone (stock item) record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::fields::{Brand, Capacity, Colour, Cost, Name, Tag, ValidationError};
use crate::model::record::{Record, RecordKind};

pub type PhoneId = Uuid;

/// A phone the seller has in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    id: PhoneId,
    name: Name,
    brand: Brand,
    capacity: Capacity,
    colour: Colour,
    cost: Cost,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

impl Phone {
    /// Creates a phone with a generated id.
    pub fn new(
        name: Name,
        brand: Brand,
        capacity: Capacity,
        colour: Colour,
        cost: Cost,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            brand,
            capacity,
            colour,
            cost,
            tags: tags.into_iter().collect(),
        }
    }

    /// Creates a phone with a caller-provided id.
    pub fn with_id(
        id: PhoneId,
        name: Name,
        brand: Brand,
        capacity: Capacity,
        colour: Colour,
        cost: Cost,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<Self, ValidationError> {
        let phone = Self {
            id,
            name,
            brand,
            capacity,
            colour,
            cost,
            tags: tags.into_iter().collect(),
        };
        phone.validate()?;
        Ok(phone)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn brand(&self) -> &Brand {
        &self.brand
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn colour(&self) -> &Colour {
        &self.colour
    }

    pub fn cost(&self) -> &Cost {
        &self.cost
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }
}

impl Record for Phone {
    const KIND: RecordKind = RecordKind::Phone;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Brand: {} Capacity: {} Colour: {} Cost: {}",
            self.name, self.brand, self.capacity, self.colour, self.cost
        )
    }
}

/// Field replacements for an edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneChanges {
    pub name: Option<Name>,
    pub brand: Option<Brand>,
    pub capacity: Option<Capacity>,
    pub colour: Option<Colour>,
    pub cost: Option<Cost>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl PhoneChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.capacity.is_none()
            && self.colour.is_none()
            && self.cost.is_none()
            && self.tags.is_none()
    }

    pub fn apply(&self, phone: &Phone) -> Phone {
        Phone {
            id: phone.id,
            name: self.name.clone().unwrap_or_else(|| phone.name.clone()),
            brand: self.brand.clone().unwrap_or_else(|| phone.brand.clone()),
            capacity: self.capacity.unwrap_or(phone.capacity),
            colour: self.colour.clone().unwrap_or_else(|| phone.colour.clone()),
            cost: self.cost.clone().unwrap_or_else(|| phone.cost.clone()),
            tags: self.tags.clone().unwrap_or_else(|| phone.tags.clone()),
        }
    }
}
