//! Undo/Redo history of completed drags.
//!
//! Every committed drag becomes one entry holding the before/after world
//! matrix of each target it touched, so undo and redo restore poses exactly
//! rather than re-running the manipulation.

use manip_math::Mat4;

use crate::target::{TargetId, TargetStore};

/// Before/after matrices of one target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryItem {
    pub target: TargetId,
    pub before: Mat4,
    pub after: Mat4,
}

/// One undoable manipulation covering all of its targets.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub description: String,
    pub items: Vec<HistoryItem>,
}

impl HistoryEntry {
    pub fn new(description: impl Into<String>, items: Vec<HistoryItem>) -> Self {
        Self {
            description: description.into(),
            items,
        }
    }

    /// Write every target's `before` matrix. Returns how many were written.
    pub fn restore_before(&self, store: &mut dyn TargetStore) -> usize {
        self.write(store, |item| item.before)
    }

    /// Write every target's `after` matrix. Returns how many were written.
    pub fn restore_after(&self, store: &mut dyn TargetStore) -> usize {
        self.write(store, |item| item.after)
    }

    fn write(&self, store: &mut dyn TargetStore, pick: impl Fn(&HistoryItem) -> Mat4) -> usize {
        let mut written = 0;
        for item in &self.items {
            if store.set_world_matrix(item.target, pick(item)) {
                written += 1;
            } else {
                log::warn!("History target {} no longer exists", item.target);
            }
        }
        written
    }
}

/// Undo/redo history stack.
#[derive(Clone, Debug)]
pub struct UndoHistory {
    /// Entries that can be undone
    undo_stack: Vec<HistoryEntry>,
    /// Entries that can be redone
    redo_stack: Vec<HistoryEntry>,
    /// Maximum history size
    max_size: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Check if there are entries to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are entries to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the next undo entry.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.description.as_str())
    }

    /// Get the description of the next redo entry.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }

    /// Record a new entry. Clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        self.redo_stack.clear(); // Clear redo on new action
        self.trim();
    }

    /// Change the size limit, dropping the oldest entries if needed.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
            log::warn!("Undo history full, dropped {} oldest entries", excess);
        }
    }

    /// Pop an entry from the undo stack.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop()
    }

    /// Pop an entry from the redo stack.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop()
    }

    /// Push an entry to the undo stack (for redo completion).
    pub fn push_to_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
    }

    /// Push an entry to the redo stack (for undo completion).
    pub fn push_to_redo(&mut self, entry: HistoryEntry) {
        self.redo_stack.push(entry);
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get the number of entries in the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of entries in the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
