//! # Undo/Redo History
//!
//! Bounded undo/redo over whole-document snapshots.
//!
//! ## Design
//!
//! - `record` commits a new present; the prior present is pushed onto the
//!   bounded past ring (oldest evicted at capacity)
//! - A document deep-equal to the current present is not recorded, so
//!   re-renders that produce no real change never pollute history
//! - Any newly recorded mutation clears the redo stack
//! - Snapshots are independent owned clones; later edits to the live
//!   document can never retroactively change a stored snapshot
//! - `reset` seeds a fresh present and drops all history — template loads
//!   are not undoable steps relative to prior edits

use std::collections::VecDeque;

use mailblocks_document::Document;

use crate::EditorError;

/// Default number of past snapshots retained.
pub const DEFAULT_HISTORY_DEPTH: usize = 5;

/// Snapshot history: bounded past, single present, future cleared on
/// every new committed mutation.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    past: VecDeque<Document>,
    present: Document,
    future: Vec<Document>,
    capacity: usize,
}

impl HistoryManager {
    /// History seeded with `present`, default depth.
    pub fn new(present: Document) -> Self {
        Self::with_capacity(present, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_capacity(present: Document, capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            capacity,
        }
    }

    pub fn present(&self) -> &Document {
        &self.present
    }

    /// Commit a new present snapshot. Returns `false` (and changes
    /// nothing) when `new_doc` deep-equals the current present.
    pub fn record(&mut self, new_doc: Document) -> bool {
        if new_doc == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, new_doc);
        self.past.push_back(previous);
        if self.past.len() > self.capacity {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Step back one snapshot.
    pub fn undo(&mut self) -> Result<&Document, EditorError> {
        let previous = self.past.pop_back().ok_or(EditorError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Ok(&self.present)
    }

    /// Step forward one snapshot.
    pub fn redo(&mut self) -> Result<&Document, EditorError> {
        let next = self.future.pop().ok_or(EditorError::NothingToRedo)?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Ok(&self.present)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Replace the present and drop all history (template load, external
    /// document reset).
    pub fn reset(&mut self, present: Document) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }
}
