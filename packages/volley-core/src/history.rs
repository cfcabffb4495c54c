//! Bounded stack of whole-state snapshots backing undo.

use std::collections::VecDeque;

use crate::model::{MatchState, UNDO_DEPTH};

/// Never empty: the top entry is the state undo would return to last.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<MatchState>,
    capacity: usize,
}

impl UndoStack {
    pub fn new(root: MatchState) -> Self {
        Self::with_capacity(root, UNDO_DEPTH)
    }

    pub fn with_capacity(root: MatchState, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(root);
        Self {
            entries,
            capacity: capacity.max(1),
        }
    }

    /// Record a settled state, evicting the oldest snapshot when full.
    pub fn push(&mut self, state: MatchState) {
        self.entries.push_back(state);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop the newest snapshot and return the one beneath it.
    /// `None` at the root.
    pub fn undo(&mut self) -> Option<&MatchState> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop_back();
        self.entries.back()
    }

    /// Collapse the history to a single entry.
    pub fn reset_to(&mut self, root: MatchState) {
        self.entries.clear();
        self.entries.push_back(root);
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
