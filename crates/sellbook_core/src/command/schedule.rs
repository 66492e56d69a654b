//! Schedule commands.
//!
//! Adding or editing a schedule is refused when it clashes with an existing
//! one at the same venue, unless the command explicitly allows conflicts.

use chrono::NaiveDateTime;
use log::info;
use std::collections::BTreeSet;

use crate::command::{
    resolve, CommandAction, CommandError, CommandOutcome, CommandResult, Index, Journal, Panel,
};
use crate::model::fields::{Tag, Venue};
use crate::model::record::Record;
use crate::model::schedule::{Schedule, ScheduleChanges};
use crate::service::model_service::{ModelError, ModelService};

/// Schedules the order at a displayed index.
#[derive(Debug, Clone)]
pub struct AddSchedule {
    order: Index,
    time: NaiveDateTime,
    duration_minutes: Option<u32>,
    venue: Venue,
    tags: BTreeSet<Tag>,
    allow_conflicts: bool,
    schedule: Option<Schedule>,
    journal: Journal,
}

impl AddSchedule {
    pub fn new(order: Index, time: NaiveDateTime, venue: Venue, tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            order,
            time,
            duration_minutes: None,
            venue,
            tags: tags.into_iter().collect(),
            allow_conflicts: false,
            schedule: None,
            journal: Journal::default(),
        }
    }

    /// Occupies `minutes` from the start time instead of a single minute.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Stores the schedule even when it clashes with existing ones.
    pub fn allow_conflicts(mut self) -> Self {
        self.allow_conflicts = true;
        self
    }

    /// Schedule created on first execution.
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    fn build(&self, model: &ModelService) -> CommandResult<Schedule> {
        let order = resolve(&model.filtered_orders(), self.order, Panel::Orders)?;
        let schedule = Schedule::new(order.id(), self.time, self.venue.clone(), self.tags.iter().cloned());
        match self.duration_minutes {
            Some(minutes) => Ok(schedule.with_duration(minutes)?),
            None => Ok(schedule),
        }
    }
}

impl CommandAction for AddSchedule {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let schedule = match &self.schedule {
            Some(schedule) => schedule.clone(),
            None => self.build(model)?,
        };
        ensure_unscheduled(model, &schedule)?;
        if !self.allow_conflicts {
            ensure_no_conflicts(model, &schedule)?;
        }
        let changes = model.schedule_order(schedule.clone())?;
        self.journal.record(changes);
        let feedback = format!("New schedule added: {schedule}");
        self.schedule = Some(schedule);
        Ok(CommandOutcome::on(Panel::Schedules, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Deletes the schedule at a displayed index; its order becomes unscheduled.
#[derive(Debug, Clone)]
pub struct DeleteSchedule {
    index: Index,
    target: Option<Schedule>,
    journal: Journal,
}

impl DeleteSchedule {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for DeleteSchedule {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve(&model.filtered_schedules(), self.index, Panel::Schedules)?,
        };
        let changes = model.delete_schedule(&target)?;
        self.journal.record(changes);
        let feedback = format!("Deleted Schedule: {target}");
        self.target = Some(target);
        Ok(CommandOutcome::on(Panel::Schedules, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct EditSchedule {
    index: Index,
    changes: ScheduleChanges,
    allow_conflicts: bool,
    resolved: Option<(Schedule, Schedule)>,
    journal: Journal,
}

impl EditSchedule {
    pub fn new(index: Index, changes: ScheduleChanges) -> Self {
        Self {
            index,
            changes,
            allow_conflicts: false,
            resolved: None,
            journal: Journal::default(),
        }
    }

    pub fn allow_conflicts(mut self) -> Self {
        self.allow_conflicts = true;
        self
    }
}

impl CommandAction for EditSchedule {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let (target, edited) = match &self.resolved {
            Some(resolved) => resolved.clone(),
            None => {
                let target = resolve(&model.filtered_schedules(), self.index, Panel::Schedules)?;
                let edited = self.changes.apply(&target)?;
                (target, edited)
            }
        };
        if !self.allow_conflicts {
            ensure_no_conflicts(model, &edited)?;
        }
        let changes = model.set_schedule(&target, edited.clone())?;
        self.journal.record(changes);
        let feedback = format!("Edited Schedule: {edited}");
        self.resolved = Some((target, edited));
        Ok(CommandOutcome::on(Panel::Schedules, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Removes every schedule; all orders become unscheduled.
#[derive(Debug, Clone, Default)]
pub struct ClearSchedules {
    journal: Journal,
}

impl ClearSchedules {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandAction for ClearSchedules {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.clear_schedules();
        self.journal.record(changes);
        Ok(CommandOutcome::on(Panel::Schedules, "Schedule list has been cleared!"))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// An order holds at most one schedule; checked before the conflict scan so
/// the order's own schedule is never reported as a clash.
fn ensure_unscheduled(model: &ModelService, schedule: &Schedule) -> CommandResult<()> {
    match model.orders().get(schedule.order_id()) {
        Some(order) if order.schedule().is_some() => {
            Err(ModelError::AlreadyScheduled(order.id()).into())
        }
        _ => Ok(()),
    }
}

fn ensure_no_conflicts(model: &ModelService, candidate: &Schedule) -> CommandResult<()> {
    let conflicts = model.conflicting_schedules(candidate);
    if conflicts.is_empty() {
        return Ok(());
    }
    info!(
        "event=schedule_conflict module=command status=rejected schedule_id={} conflicts={}",
        candidate.id(),
        conflicts.len()
    );
    Err(CommandError::ScheduleConflict {
        conflicts: conflicts.iter().map(Record::id).collect(),
    })
}
