//! Customer commands.

use crate::command::{resolve, CommandAction, CommandOutcome, CommandResult, Index, Journal, Panel};
use crate::model::customer::{Customer, CustomerChanges};
use crate::service::model_service::ModelService;

/// Adds a new customer.
#[derive(Debug, Clone)]
pub struct AddCustomer {
    customer: Customer,
    journal: Journal,
}

impl AddCustomer {
    pub fn new(customer: Customer) -> Self {
        Self {
            customer,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for AddCustomer {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.add_customer(self.customer.clone())?;
        self.journal.record(changes);
        Ok(CommandOutcome::on(
            Panel::Customers,
            format!("New customer added: {}", self.customer),
        ))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Deletes the customer at a displayed index, cascading to their orders.
#[derive(Debug, Clone)]
pub struct DeleteCustomer {
    index: Index,
    target: Option<Customer>,
    journal: Journal,
}

impl DeleteCustomer {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for DeleteCustomer {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve(&model.filtered_customers(), self.index, Panel::Customers)?,
        };
        let changes = model.delete_customer(&target)?;
        let removed_orders = changes.removed_orders();
        self.journal.record(changes);
        let feedback = if removed_orders == 0 {
            format!("Deleted Customer: {target}")
        } else {
            format!("Deleted Customer: {target} (and {removed_orders} order(s))")
        };
        self.target = Some(target);
        Ok(CommandOutcome::on(Panel::Customers, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Edits the customer at a displayed index; orders embedding it follow.
#[derive(Debug, Clone)]
pub struct EditCustomer {
    index: Index,
    changes: CustomerChanges,
    resolved: Option<(Customer, Customer)>,
    journal: Journal,
}

impl EditCustomer {
    pub fn new(index: Index, changes: CustomerChanges) -> Self {
        Self {
            index,
            changes,
            resolved: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for EditCustomer {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let (target, edited) = match &self.resolved {
            Some(resolved) => resolved.clone(),
            None => {
                let target = resolve(&model.filtered_customers(), self.index, Panel::Customers)?;
                let edited = self.changes.apply(&target);
                (target, edited)
            }
        };
        let changes = model.set_customer(&target, edited.clone())?;
        self.journal.record(changes);
        let feedback = format!("Edited Customer: {edited}");
        self.resolved = Some((target, edited));
        Ok(CommandOutcome::on(Panel::Customers, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Removes every customer and, with them, every order.
#[derive(Debug, Clone, Default)]
pub struct ClearCustomers {
    journal: Journal,
}

impl ClearCustomers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandAction for ClearCustomers {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.clear_customers();
        self.journal.record(changes);
        Ok(CommandOutcome::on(
            Panel::Customers,
            "Customer list has been cleared!",
        ))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}
