/// Maximum number of submitted commands to keep.
pub const MAX_HISTORY: usize = 50;

/// Most-recent-first list of submitted inputs with a navigation cursor.
/// `None` means the input field shows live text rather than a history entry.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(entries: Vec<String>) -> Self {
        let mut entries = entries;
        entries.truncate(MAX_HISTORY);
        Self {
            entries,
            cursor: None,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepends a submission, enforces the cap and resets navigation.
    pub fn push(&mut self, input: &str) {
        self.entries.insert(0, input.to_string());
        self.entries.truncate(MAX_HISTORY);
        self.cursor = None;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Moves toward older entries; saturates at the oldest. Returns the entry
    /// now under the cursor, if the move selected one.
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.cursor {
            None => 0,
            Some(index) => (index + 1).min(self.entries.len() - 1),
        };
        self.cursor = Some(next);
        Some(self.entries[next].as_str())
    }

    /// Moves toward newer entries; stepping past the newest clears the cursor
    /// and returns `None` (empty input).
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            None | Some(0) => {
                self.cursor = None;
                None
            }
            Some(index) => {
                self.cursor = Some(index - 1);
                Some(self.entries[index - 1].as_str())
            }
        }
    }

    /// Directly selects an entry, e.g. from a click in the history panel.
    pub fn select(&mut self, index: usize) -> Option<&str> {
        if index >= self.entries.len() {
            return None;
        }
        self.cursor = Some(index);
        Some(self.entries[index].as_str())
    }
}
