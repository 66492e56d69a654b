//! Schedule conflict detection.
//!
//! # Responsibility
//! - Find existing schedules that clash with a candidate schedule.
//!
//! # Invariants
//! - Detection is read-only and never fails; "no conflicts" is an empty list.
//! - Two schedules conflict iff they share a venue and their occupied
//!   spans overlap. The relation is symmetric and never reflexive.

use crate::model::record::Record;
use crate::model::schedule::Schedule;

/// Half-open interval `[start, end)` in whole minutes since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteSpan {
    pub start: i64,
    pub end: i64,
}

impl MinuteSpan {
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(start < end, "MinuteSpan start must be before end");
        Self { start, end }
    }

    pub fn overlaps(&self, other: &MinuteSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Returns true when `a` and `b` are distinct schedules that clash.
pub fn conflicts_with(a: &Schedule, b: &Schedule) -> bool {
    !a.is_same(b) && a.venue() == b.venue() && a.span().overlaps(&b.span())
}

/// Returns every schedule in `existing` that clashes with `candidate`,
/// in collection order.
pub fn find_conflicts(candidate: &Schedule, existing: &[Schedule]) -> Vec<Schedule> {
    existing
        .iter()
        .filter(|schedule| conflicts_with(candidate, schedule))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields::Venue;
    use crate::model::schedule::parse_schedule_time;
    use uuid::Uuid;

    fn schedule(venue: &str, time: &str) -> Schedule {
        Schedule::new(
            Uuid::new_v4(),
            parse_schedule_time(time).unwrap(),
            Venue::parse(venue).unwrap(),
            [],
        )
    }

    #[test]
    fn same_venue_same_minute_conflicts() {
        let existing = schedule("CBD", "2024-01-01 10:00");
        let candidate = schedule("CBD", "2024-01-01 10:00");
        assert_eq!(find_conflicts(&candidate, &[existing.clone()]), vec![existing]);
    }

    #[test]
    fn different_minute_or_venue_does_not_conflict() {
        let existing = vec![schedule("CBD", "2024-01-01 10:00"), schedule("Jurong", "2024-01-01 12:00")];
        let candidate = schedule("CBD", "2024-01-01 12:00");
        assert!(find_conflicts(&candidate, &existing).is_empty());
    }

    #[test]
    fn explicit_durations_conflict_on_overlap_only() {
        let hour = schedule("CBD", "2024-01-01 10:00").with_duration(60).unwrap();
        let inside = schedule("CBD", "2024-01-01 10:10");
        let adjacent = schedule("CBD", "2024-01-01 11:00");

        assert!(conflicts_with(&hour, &inside));
        assert!(conflicts_with(&inside, &hour));
        assert!(!conflicts_with(&hour, &adjacent));
    }

    #[test]
    fn relation_is_symmetric_and_irreflexive() {
        let a = schedule("CBD", "2024-01-01 10:00").with_duration(30).unwrap();
        let b = schedule("CBD", "2024-01-01 10:15");
        assert_eq!(conflicts_with(&a, &b), conflicts_with(&b, &a));
        assert!(!conflicts_with(&a, &a));
        assert!(find_conflicts(&a, &[a.clone()]).is_empty());
    }
}
