//! Append-only log of executed command text.

/// Textual log of successfully executed commands.
///
/// Never rolled back by undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: impl Into<String>) {
        self.entries.push(text.into());
    }

    /// Entries from most recent to earliest.
    pub fn newest_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_most_recent_first() {
        let mut history = CommandHistory::new();
        history.add("add-c n/Alice");
        history.add("list-c");
        assert_eq!(
            history.newest_first().collect::<Vec<_>>(),
            vec!["list-c", "add-c n/Alice"]
        );
        assert_eq!(history.len(), 2);
    }
}
