//! Order commands.
//!
//! Orders embed snapshots of the customer and phone shown at the given
//! indexes when the command first runs.

use std::collections::BTreeSet;

use crate::command::{resolve, CommandAction, CommandOutcome, CommandResult, Index, Journal, Panel};
use crate::model::fields::{Price, Tag};
use crate::model::order::{Order, OrderChanges};
use crate::service::model_service::ModelService;

/// Creates an order for the customer and phone at displayed indexes.
#[derive(Debug, Clone)]
pub struct AddOrder {
    customer: Index,
    phone: Index,
    price: Price,
    tags: BTreeSet<Tag>,
    order: Option<Order>,
    journal: Journal,
}

impl AddOrder {
    pub fn new(customer: Index, phone: Index, price: Price, tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            customer,
            phone,
            price,
            tags: tags.into_iter().collect(),
            order: None,
            journal: Journal::default(),
        }
    }

    /// Order created on first execution.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }
}

impl CommandAction for AddOrder {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let order = match &self.order {
            Some(order) => order.clone(),
            None => {
                let customer = resolve(&model.filtered_customers(), self.customer, Panel::Customers)?;
                let phone = resolve(&model.filtered_phones(), self.phone, Panel::Phones)?;
                Order::new(customer, phone, self.price.clone(), self.tags.iter().cloned())
            }
        };
        let changes = model.add_order(order.clone())?;
        self.journal.record(changes);
        let feedback = format!("New order added: {order}");
        self.order = Some(order);
        Ok(CommandOutcome::on(Panel::Orders, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Deletes the order at a displayed index together with its schedule.
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    index: Index,
    target: Option<Order>,
    journal: Journal,
}

impl DeleteOrder {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for DeleteOrder {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve(&model.filtered_orders(), self.index, Panel::Orders)?,
        };
        let changes = model.delete_order(&target)?;
        self.journal.record(changes);
        let feedback = format!("Deleted Order: {target}");
        self.target = Some(target);
        Ok(CommandOutcome::on(Panel::Orders, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct EditOrder {
    index: Index,
    changes: OrderChanges,
    resolved: Option<(Order, Order)>,
    journal: Journal,
}

impl EditOrder {
    pub fn new(index: Index, changes: OrderChanges) -> Self {
        Self {
            index,
            changes,
            resolved: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for EditOrder {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let (target, edited) = match &self.resolved {
            Some(resolved) => resolved.clone(),
            None => {
                let target = resolve(&model.filtered_orders(), self.index, Panel::Orders)?;
                let edited = self.changes.apply(&target);
                (target, edited)
            }
        };
        let changes = model.set_order(&target, edited.clone())?;
        self.journal.record(changes);
        let feedback = format!("Edited Order: {edited}");
        self.resolved = Some((target, edited));
        Ok(CommandOutcome::on(Panel::Orders, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

/// Marks the order at a displayed index as completed and archives it.
#[derive(Debug, Clone)]
pub struct CompleteOrder {
    index: Index,
    target: Option<Order>,
    journal: Journal,
}

impl CompleteOrder {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            target: None,
            journal: Journal::default(),
        }
    }
}

impl CommandAction for CompleteOrder {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve(&model.filtered_orders(), self.index, Panel::Orders)?,
        };
        let changes = model.complete_order(&target)?;
        self.journal.record(changes);
        let feedback = format!("Completed Order: {target}");
        self.target = Some(target);
        Ok(CommandOutcome::on(Panel::ArchivedOrders, feedback))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClearOrders {
    journal: Journal,
}

impl ClearOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandAction for ClearOrders {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let changes = model.clear_orders();
        self.journal.record(changes);
        Ok(CommandOutcome::on(Panel::Orders, "Order list has been cleared!"))
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        self.journal.revert(model)
    }

    fn is_reversible(&self) -> bool {
        true
    }
}
