//! Directional selections.
//!
//! A [`Selection`] is a [`Range`] plus a direction recording which endpoint is
//! the caret (the "active" end, moved by extending operations) and which is
//! the anchor. An empty selection is a plain caret.

use crate::position::{Position, Range};

/// Which endpoint of the underlying range holds the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    /// Anchor at `range.start`, caret at `range.end`.
    Ltr,
    /// Anchor at `range.end`, caret at `range.start`.
    Rtl,
}

/// A range with a direction. Equality considers the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Underlying ordered range.
    pub range: Range,
    /// Which endpoint is the caret.
    pub direction: SelectionDirection,
}

impl Selection {
    /// A caret (empty selection) at `position`.
    pub fn caret(position: Position) -> Self {
        Self {
            range: Range::collapsed(position),
            direction: SelectionDirection::Ltr,
        }
    }

    /// Build a selection from its anchor and active (caret) endpoints.
    pub fn from_anchor_active(anchor: Position, active: Position) -> Self {
        if active < anchor {
            Self {
                range: Range { start: active, end: anchor },
                direction: SelectionDirection::Rtl,
            }
        } else {
            Self {
                range: Range { start: anchor, end: active },
                direction: SelectionDirection::Ltr,
            }
        }
    }

    /// Build a selection from an ordered range and an explicit direction.
    pub fn from_range(range: Range, direction: SelectionDirection) -> Self {
        Self { range, direction }
    }

    /// The anchor endpoint (`selectionStart`).
    pub fn anchor(&self) -> Position {
        match self.direction {
            SelectionDirection::Ltr => self.range.start,
            SelectionDirection::Rtl => self.range.end,
        }
    }

    /// The caret endpoint (`position`).
    pub fn active(&self) -> Position {
        match self.direction {
            SelectionDirection::Ltr => self.range.end,
            SelectionDirection::Rtl => self.range.start,
        }
    }

    /// `true` if this selection is a caret.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Collapse to a caret at the active end.
    pub fn collapse_to_active(&self) -> Self {
        Selection::caret(self.active())
    }

    /// Keep the anchor, move the caret to `active`.
    pub fn with_active(&self, active: Position) -> Self {
        Selection::from_anchor_active(self.anchor(), active)
    }
}
