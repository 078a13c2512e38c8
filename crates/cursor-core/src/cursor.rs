//! Per-cursor state.
//!
//! One cursor is a pair of selection states: a buffer-space (*model*) state
//! and a presentation-space (*view*) state. With no wrapping collaborator in
//! scope the view state is the validated image of the model state, but the
//! pair is kept so that movement can run in view coordinates and so that a
//! future view mapper slots in without touching callers.

use crate::buffer::CursorBuffer;
use crate::position::Position;
use crate::selection::Selection;

/// A selection plus the transient layout remainder carried between
/// consecutive vertical moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    /// The selection (a caret when empty).
    pub selection: Selection,
    /// Visible cells the last vertical move could not realize on a short
    /// line; re-applied by the next vertical move, reset by anything else.
    pub leftover_visible_column: usize,
}

impl SelectionState {
    /// A caret state at `position` with no leftover.
    pub fn caret(position: Position) -> Self {
        Self {
            selection: Selection::caret(position),
            leftover_visible_column: 0,
        }
    }

    /// Wrap a selection with no leftover.
    pub fn new(selection: Selection) -> Self {
        Self { selection, leftover_visible_column: 0 }
    }
}

/// One cursor: model-space and view-space selection states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    /// Buffer-coordinate state.
    pub model: SelectionState,
    /// Presentation-coordinate state.
    pub view: SelectionState,
}

impl CursorState {
    /// Build a cursor from a model-space selection; the view state mirrors it.
    pub fn from_model_selection(buffer: &dyn CursorBuffer, selection: Selection) -> Self {
        let validated = buffer.validate_selection(selection);
        let state = SelectionState::new(validated);
        Self { model: state, view: state }
    }

    /// A cursor collapsed at `position`.
    pub fn at(buffer: &dyn CursorBuffer, position: Position) -> Self {
        Self::from_model_selection(buffer, Selection::caret(buffer.validate_position(position)))
    }

    /// Replace the model state and derive the view state from it.
    pub fn with_model(state: SelectionState) -> Self {
        Self { model: state, view: state }
    }

    /// Re-validate both spaces against the current buffer.
    pub fn ensure_valid(&self, buffer: &dyn CursorBuffer) -> Self {
        let mut validated = Self::from_model_selection(buffer, self.model.selection);
        validated.model.leftover_visible_column = self.model.leftover_visible_column;
        validated.view.leftover_visible_column = self.view.leftover_visible_column;
        validated
    }

    /// The model-space caret position.
    pub fn position(&self) -> Position {
        self.model.selection.active()
    }

    /// The model-space selection.
    pub fn selection(&self) -> Selection {
        self.model.selection
    }
}
