//! Linear undo/redo stack of reversible commands.

use crate::command::{Command, CommandAction};

/// Two stacks: executed commands that can be undone, and undone commands
/// that can be redone.
///
/// Pushing a new reversible command discards the redo side.
#[derive(Debug, Clone, Default)]
pub struct UndoRedoStack {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl UndoRedoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly executed command. Irreversible commands are ignored.
    pub fn push(&mut self, command: Command) {
        if !command.is_reversible() {
            return;
        }
        self.undo.push(command);
        self.redo.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Command> {
        self.undo.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Command> {
        self.redo.pop()
    }

    /// Puts an executed command on the undo side without touching redo.
    pub(crate) fn push_executed(&mut self, command: Command) {
        self.undo.push(command);
    }

    pub(crate) fn push_redo(&mut self, command: Command) {
        self.redo.push(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
