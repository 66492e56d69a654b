//! Phone commands.

use crate::command::{resolve, CommandAction, CommandOutcome, CommandResult, Index, Journal, Panel};
use crate::model::phone::{Phone, PhoneChanges};
use crate::service::model_service::ModelService;

#[derive(Debug, Clone)]
pub struct AddPhone {
    phone: Phone,
    journal: Journal,
}

impl AddPhone {
    pub fn new(phone: Phone) -> Self {
        Self {
            phone,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for AddPhone {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.add_phone(self.phone.clone())?;
        self.journal.record(changes);
        Ok(CommandOutcome::on(
            Panel::Phones,
            format!("New phone added: {}", self.phone),
        ))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Deletes the phone at a displayed index, cascading to its orders.
#[derive(Debug, Clone)]
pub struct DeletePhone {
    index: Index,
    target: Option<Phone>,
    journal: Journal,
}

impl DeletePhone {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for DeletePhone {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve(&model.filtered_phones(), self.index, Panel::Phones)?,
        };
        let changes = model.delete_phone(&target)?;
        let removed_orders = changes.removed_orders();
        self.journal.record(changes);
        let feedback = if removed_orders == 0 {
            format!("Deleted Phone: {target}")
        } else {
            format!("Deleted Phone: {target} (and {removed_orders} order(s))")
        };
        self.target = Some(target);
        Ok(CommandOutcome::on(Panel::Phones, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct EditPhone {
    index: Index,
    changes: PhoneChanges,
    resolved: Option<(Phone, Phone)>,
    journal: Journal,
}

impl EditPhone {
    pub fn new(index: Index, changes: PhoneChanges) -> Self {
        Self {
            index,
            changes,
            resolved: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for EditPhone {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let (target, edited) = match &self.resolved {
            Some(resolved) => resolved.clone(),
            None => {
                let target = resolve(&model.filtered_phones(), self.index, Panel::Phones)?;
                let edited = self.changes.apply(&target);
                (target, edited)
            }
        };
        let changes = model.set_phone(&target, edited.clone())?;
        self.journal.record(changes);
        let feedback = format!("Edited Phone: {edited}");
        self.resolved = Some((target, edited));
        Ok(CommandOutcome::on(Panel::Phones, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClearPhones {
    journal: Journal,
}

impl ClearPhones {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandAction for ClearPhones {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.clear_phones();
        self.journal.record(changes);
        Ok(CommandOutcome::on(Panel::Phones, "Phone list has been cleared!"))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}
