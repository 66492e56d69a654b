//! Dispatcher context owning the model, command history and undo/redo stack.
//!
//! # Invariants
//! - Only successful commands are logged to history.
//! - Only successful reversible commands reach the undo side; doing so
//!   clears the redo side.
//! - A failed undo or redo puts the command back where it came from.

use log::{info, warn};

use crate::command::history::CommandHistory;
use crate::command::undo_stack::UndoRedoStack;
use crate::command::{Command, CommandAction, CommandError, CommandOutcome, CommandResult, Direction};
use crate::service::model_service::ModelService;

/// One user session over a model.
#[derive(Debug, Default)]
pub struct Session {
    model: ModelService,
    history: CommandHistory,
    stack: UndoRedoStack,
}

impl Session {
    pub fn new(model: ModelService) -> Self {
        Self {
            model,
            history: CommandHistory::new(),
            stack: UndoRedoStack::new(),
        }
    }

    pub fn model(&self) -> &ModelService {
        &self.model
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn stack(&self) -> &UndoRedoStack {
        &self.stack
    }

    pub fn into_model(self) -> ModelService {
        self.model
    }

    /// Runs `command`, logging `text` to history on success.
    pub fn execute(&mut self, text: impl Into<String>, command: Command) -> CommandResult<CommandOutcome> {
        let name = command.name();
        let result = self.dispatch(command);
        match &result {
            Ok(_) => {
                self.history.add(text);
                info!("event=command_execute module=command status=ok command={name}");
            }
            Err(err) => {
                warn!("event=command_execute module=command status=error command={name} error={err}");
            }
        }
        result
    }

    /// Reverts the most recent reversible command.
    pub fn undo(&mut self) -> CommandResult<CommandOutcome> {
        let mut command = self
            .stack
            .pop_undo()
            .ok_or(CommandError::NoHistory(Direction::Undo))?;
        match command.undo(&mut self.model) {
            Ok(()) => {
                info!(
                    "event=command_undo module=command status=ok command={}",
                    command.name()
                );
                self.stack.push_redo(command);
                Ok(CommandOutcome::new("Undo success!", None))
            }
            Err(err) => {
                self.stack.push_executed(command);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self) -> CommandResult<CommandOutcome> {
        let mut command = self
            .stack
            .pop_redo()
            .ok_or(CommandError::NoHistory(Direction::Redo))?;
        match command.redo(&mut self.model) {
            Ok(outcome) => {
                info!(
                    "event=command_redo module=command status=ok command={}",
                    command.name()
                );
                self.stack.push_executed(command);
                Ok(CommandOutcome::new("Redo success!", outcome.panel))
            }
            Err(err) => {
                self.stack.push_redo(command);
                Err(err)
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> CommandResult<CommandOutcome> {
        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::History => Ok(self.history_outcome()),
            mut command => {
                let outcome = command.execute(&mut self.model)?;
                self.stack.push(command);
                Ok(outcome)
            }
        }
    }

    fn history_outcome(&self) -> CommandOutcome {
        if self.history.is_empty() {
            return CommandOutcome::new("You have not yet entered any commands.", None);
        }
        let entries: Vec<&str> = self.history.newest_first().collect();
        CommandOutcome::new(
            format!(
                "Entered commands (from most recent to earliest):\n{}",
                entries.join("\n")
            ),
            None,
        )
    }
}
