//! Ordered cursor collection.
//!
//! Owns every [`CursorState`]. Index 0 is the *primary* cursor; order is
//! significant (it drives conflict arbitration precedence, reveal tie-breaks,
//! and paste distribution). After every intent the collection is normalized:
//! cursors whose model-space selections are identical, overlapping, or
//! touching are merged, always keeping the lower index. At least one cursor
//! exists at all times.

use crate::buffer::CursorBuffer;
use crate::cursor::{CursorState, SelectionState};
use crate::position::Position;
use crate::selection::Selection;

/// The ordered set of cursors.
#[derive(Debug, Clone)]
pub struct CursorCollection {
    cursors: Vec<CursorState>,
    last_added: usize,
}

impl CursorCollection {
    /// A collection with a single primary cursor at the buffer start.
    pub fn new(buffer: &dyn CursorBuffer) -> Self {
        Self {
            cursors: vec![CursorState::at(buffer, Position::new(1, 1))],
            last_added: 0,
        }
    }

    /// All cursors in order; index 0 is primary.
    pub fn all(&self) -> &[CursorState] {
        &self.cursors
    }

    /// The primary cursor.
    pub fn primary(&self) -> &CursorState {
        &self.cursors[0]
    }

    /// Number of cursors (always at least 1).
    pub fn count(&self) -> usize {
        self.cursors.len()
    }

    /// Model-space selections of every cursor, in order.
    pub fn selections(&self) -> Vec<Selection> {
        self.cursors.iter().map(|c| c.selection()).collect()
    }

    /// View-space selections of every cursor, in order.
    pub fn view_selections(&self) -> Vec<Selection> {
        self.cursors.iter().map(|c| c.view.selection).collect()
    }

    /// Replace all cursors with per-index new states. A `None` entry drops
    /// that cursor. `preserve_leftover` keeps each surviving cursor's current
    /// leftover visible column instead of adopting the new state's.
    pub fn set_states(&mut self, states: Vec<Option<CursorState>>, preserve_leftover: bool) {
        let mut next: Vec<CursorState> = Vec::with_capacity(states.len());
        for (index, state) in states.into_iter().enumerate() {
            let Some(mut state) = state else { continue };
            if preserve_leftover {
                if let Some(old) = self.cursors.get(index) {
                    state.model.leftover_visible_column = old.model.leftover_visible_column;
                    state.view.leftover_visible_column = old.view.leftover_visible_column;
                }
            }
            next.push(state);
        }
        if next.is_empty() {
            // The collection never goes empty; keep the current primary.
            next.push(self.cursors[0]);
        }
        self.cursors = next;
        self.last_added = self.last_added.min(self.cursors.len() - 1);
    }

    /// Replace cursors by model-space selection. Existing cursors are reused
    /// index-by-index (keeping their leftover columns); extra cursors are
    /// created, surplus ones dropped.
    pub fn set_selections(&mut self, buffer: &dyn CursorBuffer, selections: &[Selection]) {
        debug_assert!(!selections.is_empty());
        let mut next: Vec<CursorState> = Vec::with_capacity(selections.len());
        for (index, selection) in selections.iter().enumerate() {
            let mut state = CursorState::from_model_selection(buffer, *selection);
            if let Some(old) = self.cursors.get(index) {
                state.model.leftover_visible_column = old.model.leftover_visible_column;
                state.view.leftover_visible_column = old.view.leftover_visible_column;
            }
            next.push(state);
        }
        if next.is_empty() {
            next.push(self.cursors[0]);
        }
        self.cursors = next;
        self.last_added = self.last_added.min(self.cursors.len() - 1);
    }

    /// Append a secondary cursor and remember it as the last added.
    /// Returns its index.
    pub fn add_secondary(&mut self, buffer: &dyn CursorBuffer, selection: Selection) -> usize {
        self.cursors
            .push(CursorState::from_model_selection(buffer, selection));
        self.last_added = self.cursors.len() - 1;
        self.last_added
    }

    /// The cursor most recently appended via
    /// [`add_secondary`](Self::add_secondary) (or the primary if none
    /// survive).
    pub fn last_added(&self) -> &CursorState {
        &self.cursors[self.last_added]
    }

    /// Index of the last-added cursor.
    pub fn last_added_index(&self) -> usize {
        self.last_added
    }

    /// Mark `index` as the last-added cursor.
    pub fn set_last_added(&mut self, index: usize) {
        if index < self.cursors.len() {
            self.last_added = index;
        }
    }

    /// Collapse to just the primary cursor.
    pub fn kill_secondaries(&mut self) {
        self.cursors.truncate(1);
        self.last_added = 0;
    }

    /// Re-validate every cursor against the current buffer bounds.
    pub fn ensure_valid(&mut self, buffer: &dyn CursorBuffer) {
        for cursor in &mut self.cursors {
            *cursor = cursor.ensure_valid(buffer);
        }
    }

    /// Merge cursors whose model-space selections are identical, overlapping,
    /// or touching. The lower-index cursor survives and keeps its direction;
    /// the merged range is the union of both. Runs to a fixed point, so
    /// calling it twice is a no-op.
    pub fn normalize(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.cursors.len() {
                for j in (i + 1)..self.cursors.len() {
                    let a = self.cursors[i].selection();
                    let b = self.cursors[j].selection();
                    if !a.range.intersects_or_touches(b.range) {
                        continue;
                    }

                    let union = a.range.union(b.range);
                    let direction = if a.range == b.range {
                        a.direction
                    } else if a.is_empty() && !b.is_empty() {
                        // A caret absorbed by a real selection adopts its
                        // direction; the lower index still wins identity.
                        b.direction
                    } else {
                        a.direction
                    };
                    let winner_leftover = self.cursors[i].model.leftover_visible_column;
                    let selection = Selection::from_range(union, direction);
                    let mut state = SelectionState::new(selection);
                    state.leftover_visible_column = winner_leftover;
                    self.cursors[i] = CursorState { model: state, view: state };

                    self.cursors.remove(j);
                    if self.last_added == j {
                        self.last_added = i;
                    } else if self.last_added > j {
                        self.last_added -= 1;
                    }
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
}
