//! Order record.
//!
//! # Invariants
//! - `customer` and `phone` are frozen snapshots taken at creation time.
//!   They only change when the model service cascades an edit into them.
//! - `schedule` is `Some` exactly when `status == OrderStatus::Scheduled`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::customer::Customer;
use crate::model::fields::{Price, Tag, ValidationError};
use crate::model::phone::Phone;
use crate::model::record::{Record, RecordKind};
use crate::model::schedule::ScheduleId;

pub type OrderId = Uuid;

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Unscheduled,
    Scheduled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sale of one phone to one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: Customer,
    phone: Phone,
    price: Price,
    status: OrderStatus,
    schedule: Option<ScheduleId>,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

impl Order {
    /// Creates an unscheduled order with a generated id.
    pub fn new(
        customer: Customer,
        phone: Phone,
        price: Price,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer,
            phone,
            price,
            status: OrderStatus::Unscheduled,
            schedule: None,
            tags: tags.into_iter().collect(),
        }
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn schedule(&self) -> Option<ScheduleId> {
        self.schedule
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Same order with a replaced customer snapshot.
    pub fn with_customer(&self, customer: Customer) -> Self {
        Self {
            customer,
            ..self.clone()
        }
    }

    /// Same order with a replaced phone snapshot.
    pub fn with_phone(&self, phone: Phone) -> Self {
        Self {
            phone,
            ..self.clone()
        }
    }

    pub fn scheduled(&self, schedule: ScheduleId) -> Self {
        Self {
            status: OrderStatus::Scheduled,
            schedule: Some(schedule),
            ..self.clone()
        }
    }

    pub fn unscheduled(&self) -> Self {
        Self {
            status: OrderStatus::Unscheduled,
            schedule: None,
            ..self.clone()
        }
    }

    pub fn completed(&self) -> Self {
        Self {
            status: OrderStatus::Completed,
            schedule: None,
            ..self.clone()
        }
    }
}

impl Record for Order {
    const KIND: RecordKind = RecordKind::Order;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId(RecordKind::Order));
        }
        self.customer.validate()?;
        self.phone.validate()?;

        let scheduled = self.status == OrderStatus::Scheduled;
        let has_schedule = self.schedule.is_some();
        if scheduled != has_schedule {
            return Err(ValidationError::InconsistentSchedule {
                scheduled,
                has_schedule,
            });
        }
        Ok(())
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} Customer: {} Phone: {} Price: {} Status: {}",
            self.id,
            self.customer.name(),
            self.phone.name(),
            self.price,
            self.status
        )
    }
}

/// Field replacements for an order edit.
///
/// Customer and phone snapshots are not editable here; they follow the
/// customer/phone books through cascades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub price: Option<Price>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl OrderChanges {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.tags.is_none()
    }

    pub fn apply(&self, order: &Order) -> Order {
        Order {
            price: self.price.clone().unwrap_or_else(|| order.price.clone()),
            tags: self.tags.clone().unwrap_or_else(|| order.tags.clone()),
            ..order.clone()
        }
    }
}
