//! Command protocol: execute/undo contract, history and undo/redo stack.
//!
//! # Responsibility
//! - Turn user intents into model mutations that can be reverted.
//! - Resolve one-based displayed indexes against the current panel views.
//! - Track command text for display and reversible commands for undo/redo.
//!
//! # Invariants
//! - A command either completes or fails with no model change.
//! - Reversible commands resolve their targets once; redo reuses them.
//! - Undo of a command restores the model exactly, positions included.
//!
//! # See also
//! - `session::Session` for the dispatcher that owns history and stack.

pub mod customer;
pub mod history;
pub mod order;
pub mod phone;
pub mod schedule;
pub mod session;
pub mod undo_stack;
pub mod view;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

use crate::book::BookView;
use crate::model::fields::ValidationError;
use crate::model::record::Record;
use crate::model::schedule::ScheduleId;
use crate::service::change::ChangeSet;
use crate::service::model_service::{ModelError, ModelService};

pub use customer::{AddCustomer, ClearCustomers, DeleteCustomer, EditCustomer};
pub use history::CommandHistory;
pub use order::{AddOrder, ClearOrders, CompleteOrder, DeleteOrder, EditOrder};
pub use phone::{AddPhone, ClearPhones, DeletePhone, EditPhone};
pub use schedule::{AddSchedule, ClearSchedules, DeleteSchedule, EditSchedule};
pub use session::Session;
pub use undo_stack::UndoRedoStack;
pub use view::{FindRecords, ListPanel, SwitchPanel};

pub type CommandResult<T> = Result<T, CommandError>;

/// List the rendering layer should focus after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Customers,
    Phones,
    Orders,
    Schedules,
    ArchivedOrders,
}

impl Panel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Phones => "phones",
            Self::Orders => "orders",
            Self::Schedules => "schedules",
            Self::ArchivedOrders => "archived orders",
        }
    }
}

impl Display for Panel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-based position in a displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(NonZeroUsize);

impl Index {
    /// Returns `None` for zero.
    pub fn from_one_based(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    pub fn one_based(self) -> usize {
        self.0.get()
    }

    pub fn zero_based(self) -> usize {
        self.0.get() - 1
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the undo/redo stack was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// Lifecycle of one command instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandState {
    #[default]
    Created,
    Executed,
    Undone,
    Reexecuted,
}

/// Failure of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Undo or redo requested with an empty stack side.
    NoHistory(Direction),
    /// Displayed index is past the end of the panel list.
    InvalidIndex { panel: Panel, index: Index, len: usize },
    /// Model rejected the mutation.
    Model(ModelError),
    /// Candidate schedule clashes with existing schedules.
    ScheduleConflict { conflicts: Vec<ScheduleId> },
    /// Edited values violate a field constraint.
    Validation(ValidationError),
    /// Undo requested for a command that is not in an executed state.
    InvalidState(CommandState),
    /// Undo, redo and history only run through a `Session`.
    RequiresSession(&'static str),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHistory(Direction::Undo) => write!(f, "No more commands to undo!"),
            Self::NoHistory(Direction::Redo) => write!(f, "No more commands to redo!"),
            Self::InvalidIndex { panel, index, len } => write!(
                f,
                "The {} index provided is invalid: {index} (list has {len})",
                panel.as_str()
            ),
            Self::Model(err) => write!(f, "{err}"),
            Self::ScheduleConflict { conflicts } => {
                write!(f, "schedule conflicts with {} existing schedule(s):", conflicts.len())?;
                for id in conflicts {
                    write!(f, " {id}")?;
                }
                Ok(())
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidState(state) => write!(f, "command cannot be undone in state {state:?}"),
            Self::RequiresSession(name) => write!(f, "`{name}` must be dispatched through a session"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for CommandError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// User-visible message.
    pub feedback: String,
    /// Panel to focus, if the command concerns one.
    pub panel: Option<Panel>,
}

impl CommandOutcome {
    pub fn new(feedback: impl Into<String>, panel: Option<Panel>) -> Self {
        Self {
            feedback: feedback.into(),
            panel,
        }
    }

    pub fn on(panel: Panel, feedback: impl Into<String>) -> Self {
        Self::new(feedback, Some(panel))
    }
}

/// Execute/undo contract shared by every command.
pub trait CommandAction {
    /// Applies the command to `model`.
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome>;

    /// Reverts the last successful `execute`/`redo`.
    ///
    /// Only called on reversible commands.
    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()>;

    /// Re-applies the command after `undo`, reusing resolved targets.
    fn redo(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        self.execute(model)
    }

    /// Whether the command participates in undo/redo.
    fn is_reversible(&self) -> bool;
}

/// Every command the dispatcher understands.
#[derive(Debug, Clone)]
pub enum Command {
    AddCustomer(AddCustomer),
    DeleteCustomer(DeleteCustomer),
    EditCustomer(EditCustomer),
    ClearCustomers(ClearCustomers),
    AddPhone(AddPhone),
    DeletePhone(DeletePhone),
    EditPhone(EditPhone),
    ClearPhones(ClearPhones),
    AddOrder(AddOrder),
    DeleteOrder(DeleteOrder),
    EditOrder(EditOrder),
    CompleteOrder(CompleteOrder),
    ClearOrders(ClearOrders),
    AddSchedule(AddSchedule),
    DeleteSchedule(DeleteSchedule),
    EditSchedule(EditSchedule),
    ClearSchedules(ClearSchedules),
    List(ListPanel),
    Find(FindRecords),
    Switch(SwitchPanel),
    History,
    Undo,
    Redo,
}

impl Command {
    /// Stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddCustomer(_) => "add_customer",
            Self::DeleteCustomer(_) => "delete_customer",
            Self::EditCustomer(_) => "edit_customer",
            Self::ClearCustomers(_) => "clear_customers",
            Self::AddPhone(_) => "add_phone",
            Self::DeletePhone(_) => "delete_phone",
            Self::EditPhone(_) => "edit_phone",
            Self::ClearPhones(_) => "clear_phones",
            Self::AddOrder(_) => "add_order",
            Self::DeleteOrder(_) => "delete_order",
            Self::EditOrder(_) => "edit_order",
            Self::CompleteOrder(_) => "complete_order",
            Self::ClearOrders(_) => "clear_orders",
            Self::AddSchedule(_) => "add_schedule",
            Self::DeleteSchedule(_) => "delete_schedule",
            Self::EditSchedule(_) => "edit_schedule",
            Self::ClearSchedules(_) => "clear_schedules",
            Self::List(_) => "list",
            Self::Find(_) => "find",
            Self::Switch(_) => "switch",
            Self::History => "history",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    fn action(&mut self) -> Option<&mut dyn CommandAction> {
        let action: &mut dyn CommandAction = match self {
            Self::AddCustomer(c) => c,
            Self::DeleteCustomer(c) => c,
            Self::EditCustomer(c) => c,
            Self::ClearCustomers(c) => c,
            Self::AddPhone(c) => c,
            Self::DeletePhone(c) => c,
            Self::EditPhone(c) => c,
            Self::ClearPhones(c) => c,
            Self::AddOrder(c) => c,
            Self::DeleteOrder(c) => c,
            Self::EditOrder(c) => c,
            Self::CompleteOrder(c) => c,
            Self::ClearOrders(c) => c,
            Self::AddSchedule(c) => c,
            Self::DeleteSchedule(c) => c,
            Self::EditSchedule(c) => c,
            Self::ClearSchedules(c) => c,
            Self::List(c) => c,
            Self::Find(c) => c,
            Self::Switch(c) => c,
            Self::History | Self::Undo | Self::Redo => return None,
        };
        Some(action)
    }
}

impl CommandAction for Command {
    fn execute(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let name = self.name();
        self.action()
            .ok_or(CommandError::RequiresSession(name))?
            .execute(model)
    }

    fn undo(&mut self, model: &mut ModelService) -> CommandResult<()> {
        let name = self.name();
        self.action()
            .ok_or(CommandError::RequiresSession(name))?
            .undo(model)
    }

    fn redo(&mut self, model: &mut ModelService) -> CommandResult<CommandOutcome> {
        let name = self.name();
        self.action()
            .ok_or(CommandError::RequiresSession(name))?
            .redo(model)
    }

    fn is_reversible(&self) -> bool {
        match self {
            Self::AddCustomer(_)
            | Self::DeleteCustomer(_)
            | Self::EditCustomer(_)
            | Self::ClearCustomers(_)
            | Self::AddPhone(_)
            | Self::DeletePhone(_)
            | Self::EditPhone(_)
            | Self::ClearPhones(_)
            | Self::AddOrder(_)
            | Self::DeleteOrder(_)
            | Self::EditOrder(_)
            | Self::CompleteOrder(_)
            | Self::ClearOrders(_)
            | Self::AddSchedule(_)
            | Self::DeleteSchedule(_)
            | Self::EditSchedule(_)
            | Self::ClearSchedules(_) => true,
            Self::List(_) | Self::Find(_) | Self::Switch(_) | Self::History | Self::Undo | Self::Redo => {
                false
            }
        }
    }
}

/// Change journal of a reversible command plus its lifecycle state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    state: CommandState,
    changes: Option<ChangeSet>,
}

impl Journal {
    pub(crate) fn state(&self) -> CommandState {
        self.state
    }

    pub(crate) fn record(&mut self, changes: ChangeSet) {
        self.state = match self.state {
            CommandState::Created => CommandState::Executed,
            _ => CommandState::Reexecuted,
        };
        self.changes = Some(changes);
    }

    pub(crate) fn revert(&mut self, model: &mut ModelService) -> CommandResult<()> {
        let changes = match (self.state, &self.changes) {
            (CommandState::Executed | CommandState::Reexecuted, Some(changes)) => changes,
            (state, _) => return Err(CommandError::InvalidState(state)),
        };
        model.revert(changes)?;
        self.state = CommandState::Undone;
        self.changes = None;
        Ok(())
    }
}

/// Record at one-based `index` in `view`.
pub(crate) fn resolve<T: Record>(view: &BookView<T>, index: Index, panel: Panel) -> CommandResult<T> {
    view.get(index.zero_based())
        .ok_or_else(|| CommandError::InvalidIndex {
            panel,
            index,
            len: view.len(),
        })
}
