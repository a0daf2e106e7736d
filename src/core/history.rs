//! Persisted, navigable command history.
//!
//! The history list always starts with an empty-string sentinel standing for
//! "no command selected"; the cursor ranges over `[0, len]` where `len` means
//! "past the newest entry" (a fresh input line). The whole list is persisted
//! as a JSON array of strings under a single session key.

use crate::persist::KeyValueStore;

/// Direction for history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the oldest entry.
    Older,
    /// Toward the newest entry / fresh input line.
    Newer,
}

/// Outcome of one navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Replace the input line with this entry.
    Recall(String),
    /// The cursor moved past the newest entry; clear the input line.
    ClearInput,
    /// The cursor landed on the sentinel; leave the input line alone.
    Hold,
}

/// Ordered log of submitted commands with a navigation cursor.
pub struct HistoryStore {
    entries: Vec<String>,
    pos: usize,
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl HistoryStore {
    /// Load history from the store under `key`.
    ///
    /// Absent, corrupt, or unreadable data falls back to the single-element
    /// sentinel list. Never fails.
    pub fn load(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let mut entries = store
            .get(&key)
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![String::new()]);

        // Re-establish the sentinel invariant if the stored data lost it.
        if entries.first().is_none_or(|first| !first.is_empty()) {
            entries.insert(0, String::new());
        }

        let pos = entries.len();
        Self {
            entries,
            pos,
            store,
            key,
        }
    }

    /// Append a submitted command and persist the whole list.
    ///
    /// A persistence failure is ignored; the in-memory list stays
    /// authoritative for the session. Resets the cursor past the end.
    pub fn record(&mut self, command: &str) {
        self.entries.push(command.to_string());
        self.persist();
        self.pos = self.entries.len();
    }

    fn persist(&mut self) {
        if let Ok(raw) = serde_json::to_string(&self.entries) {
            let _ = self.store.set(&self.key, &raw);
        }
    }

    /// Move the cursor one step and report what the input line should show.
    pub fn navigate(&mut self, direction: Direction) -> NavOutcome {
        match direction {
            Direction::Older => self.pos = self.pos.saturating_sub(1),
            Direction::Newer => self.pos = (self.pos + 1).min(self.entries.len()),
        }

        match self.entries.get(self.pos) {
            Some(entry) if !entry.is_empty() => NavOutcome::Recall(entry.clone()),
            Some(_) => NavOutcome::Hold,
            None => NavOutcome::ClearInput,
        }
    }

    /// Reset the cursor past the newest entry (fresh input line).
    pub fn reset_cursor(&mut self) {
        self.pos = self.entries.len();
    }

    /// The recorded commands, oldest first, sentinel excluded.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().skip(1).map(String::as_str)
    }

    /// Number of recorded commands, sentinel excluded.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    /// Whether no commands have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cursor position, for diagnostics.
    pub fn cursor(&self) -> usize {
        self.pos
    }

    /// Reset both in-memory and persisted history to empty.
    ///
    /// Not called by the `:clear` command, which only clears the transcript.
    pub fn clear(&mut self) {
        self.entries = vec![String::new()];
        self.persist();
        self.pos = self.entries.len();
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .field("pos", &self.pos)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
