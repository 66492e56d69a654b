//! Schedule (meet-up appointment) record.
//!
//! # Invariants
//! - A schedule belongs to exactly one order (`order_id`).
//! - Time is tracked at minute resolution; seconds are ignored when
//!   computing the occupied span.
//! - `duration_minutes`, when set, is within `1..=MAX_DURATION_MINUTES`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::conflict::MinuteSpan;
use crate::model::fields::{Tag, ValidationError, Venue, MAX_DURATION_MINUTES};
use crate::model::order::OrderId;
use crate::model::record::{Record, RecordKind};

pub type ScheduleId = Uuid;

/// Display/parse format for schedule times, e.g. `2024-01-01 10:00`.
pub const SCHEDULE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Appointment to hand over an order at a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    order_id: OrderId,
    time: NaiveDateTime,
    #[serde(default)]
    duration_minutes: Option<u32>,
    venue: Venue,
    #[serde(default)]
    tags: BTreeSet<Tag>,
}

impl Schedule {
    /// Creates a point-in-time schedule with a generated id.
    pub fn new(
        order_id: OrderId,
        time: NaiveDateTime,
        venue: Venue,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            time,
            duration_minutes: None,
            venue,
            tags: tags.into_iter().collect(),
        }
    }

    /// Same schedule occupying `minutes` from its anchor time.
    pub fn with_duration(&self, minutes: u32) -> Result<Self, ValidationError> {
        validate_duration(minutes)?;
        Ok(Self {
            duration_minutes: Some(minutes),
            ..self.clone()
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Time slot this schedule occupies, in whole epoch minutes.
    ///
    /// Schedules without a duration occupy a single minute.
    pub fn span(&self) -> MinuteSpan {
        let start = self.time.and_utc().timestamp().div_euclid(60);
        let length = i64::from(self.duration_minutes.unwrap_or(1).max(1));
        MinuteSpan::new(start, start + length)
    }
}

impl Record for Schedule {
    const KIND: RecordKind = RecordKind::Schedule;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId(RecordKind::Schedule));
        }
        if self.order_id.is_nil() {
            return Err(ValidationError::NilId(RecordKind::Order));
        }
        if let Some(minutes) = self.duration_minutes {
            validate_duration(minutes)?;
        }
        Ok(())
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order: {} Time: {} Venue: {}",
            self.order_id,
            self.time.format(SCHEDULE_TIME_FORMAT),
            self.venue
        )?;
        if let Some(minutes) = self.duration_minutes {
            write!(f, " Duration: {minutes}min")?;
        }
        Ok(())
    }
}

/// Parses `YYYY-MM-DD HH:MM`.
pub fn parse_schedule_time(value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(value.trim(), SCHEDULE_TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidField {
            field: "time",
            value: value.to_string(),
            constraint: "times must be formatted as YYYY-MM-DD HH:MM",
        }
    })
}

fn validate_duration(minutes: u32) -> Result<(), ValidationError> {
    if minutes == 0 || minutes > MAX_DURATION_MINUTES {
        return Err(ValidationError::InvalidDuration(minutes));
    }
    Ok(())
}

/// Field replacements for a schedule edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleChanges {
    pub time: Option<NaiveDateTime>,
    /// `Some(None)` clears an explicit duration.
    pub duration_minutes: Option<Option<u32>>,
    pub venue: Option<Venue>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl ScheduleChanges {
    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.duration_minutes.is_none()
            && self.venue.is_none()
            && self.tags.is_none()
    }

    pub fn apply(&self, schedule: &Schedule) -> Result<Schedule, ValidationError> {
        let duration_minutes = self.duration_minutes.unwrap_or(schedule.duration_minutes);
        if let Some(minutes) = duration_minutes {
            validate_duration(minutes)?;
        }
        Ok(Schedule {
            time: self.time.unwrap_or(schedule.time),
            duration_minutes,
            venue: self.venue.clone().unwrap_or_else(|| schedule.venue.clone()),
            tags: self.tags.clone().unwrap_or_else(|| schedule.tags.clone()),
            ..schedule.clone()
        })
    }
}
