//! Cursor change events and reveal requests.
//!
//! After a handled intent the controller diffs the cursor state against the
//! pre-intent snapshot and, only when something actually changed, notifies
//! subscribers: first a position change, then a selection change, then (if the
//! intent asked for it) a reveal request that the view layer turns into a
//! scroll.

use crate::position::{Position, Range};
use crate::selection::Selection;

/// Why the cursor state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorChangeReason {
    /// No specific reason recorded.
    NotSet,
    /// An explicit movement or selection intent.
    Explicit,
    /// A paste intent.
    Paste,
    /// An undo adopted the buffer's recorded selections.
    Undo,
    /// A redo adopted the buffer's recorded selections.
    Redo,
    /// The buffer content was replaced wholesale and the collection rebuilt.
    ContentFlush,
    /// Selections were recovered from sticky markers after an external edit.
    RecoverFromMarkers,
}

/// Which cursor a reveal should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTarget {
    /// The primary cursor. Suppressed when more than one cursor exists.
    Primary,
    /// The cursor whose position sorts earliest (ties keep collection order).
    TopMost,
    /// The cursor whose position sorts latest.
    BottomMost,
}

/// Primary caret moved (possibly with secondary carets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChangedEvent {
    /// New primary caret position.
    pub position: Position,
    /// Secondary caret positions, in collection order.
    pub secondary_positions: Vec<Position>,
    /// Why the change happened.
    pub reason: CursorChangeReason,
    /// The source string passed to `trigger`.
    pub source: String,
}

/// Selection set changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChangedEvent {
    /// New primary selection.
    pub selection: Selection,
    /// Secondary selections, in collection order.
    pub secondary_selections: Vec<Selection>,
    /// Why the change happened.
    pub reason: CursorChangeReason,
    /// The source string passed to `trigger`.
    pub source: String,
}

/// Request to scroll a range into view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealRequest {
    /// The range to bring into view (usually a collapsed caret range).
    pub range: Range,
    /// Which cursor the range was resolved from.
    pub target: RevealTarget,
    /// Whether horizontal scrolling is also requested.
    pub reveal_horizontal: bool,
}

/// All events emitted by the cursor controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorEvent {
    /// The primary caret (or any secondary caret) moved.
    PositionChanged(PositionChangedEvent),
    /// The selection set changed.
    SelectionChanged(SelectionChangedEvent),
    /// A range should be scrolled into view.
    RevealRequested(RevealRequest),
    /// A new-cursor request was refused because the configured cap was hit.
    /// Raised at most once per controller.
    CursorCountLimited {
        /// The configured maximum cursor count.
        limit: usize,
    },
}

/// Subscription callback type.
pub type CursorEventCallback = Box<dyn FnMut(&CursorEvent) + Send>;
