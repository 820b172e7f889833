//! Snapshot-based undo/redo
//!
//! Each history entry is a full deep copy of the grid (cells, dimensions and
//! background), never a diff. Two stacks own the entries; recording a new
//! edit invalidates everything that could have been redone.

use std::collections::VecDeque;

use crate::color::Color;
use crate::grid::Grid;

/// Immutable copy of a grid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    grid: Grid,
}

impl Snapshot {
    pub(crate) fn capture(grid: &Grid) -> Self {
        Self { grid: grid.clone() }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    pub fn background(&self) -> Option<Color> {
        self.grid.background()
    }

    /// Read-only view of the captured grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn into_grid(self) -> Grid {
        self.grid
    }
}

/// Stack-based undo/redo manager over full snapshots.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; `None` keeps everything
    limit: Option<usize>,
}

impl History {
    /// Create an empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` undo entries, dropping
    /// the oldest first. A limit of zero means unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: (limit > 0).then_some(limit), ..Self::default() }
    }

    /// Record the state *before* an edit and clear the redo stack.
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
        log::debug!("history: push undo ({} entries)", self.undo_stack.len());
    }

    /// Step back one action.
    ///
    /// `current` is the live state, which moves onto the redo stack. Returns
    /// the state to restore, or `None` (leaving both stacks untouched) when
    /// there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward one undone action. Symmetric to [`History::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all recorded actions.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
