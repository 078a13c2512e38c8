//! Buffer collaborator interface.
//!
//! The cursor engine does not own text storage. It consumes a buffer through
//! the [`CursorBuffer`] trait: line/column addressing, position validation, an
//! optional editable range, atomic edit transactions with reverse-operation
//! reporting, undo/redo with recorded selections, and sticky position markers.
//!
//! [`TextModel`](crate::TextModel) is the reference implementation; any other
//! storage (piece table, gap buffer, remote document) can sit behind this
//! trait as long as it honors the transaction semantics documented on
//! [`push_edit_operations`](CursorBuffer::push_edit_operations).

use crate::position::{Position, Range};
use crate::selection::Selection;

/// Ties an edit back to the cursor that produced it.
///
/// `major` is the cursor index; `minor` orders multiple edits emitted by the
/// same cursor within one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditIdentifier {
    /// Index of the originating cursor.
    pub major: usize,
    /// Sequence number within that cursor's edits.
    pub minor: usize,
}

/// A single text replacement requested by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    /// Originating cursor, if the edit belongs to one.
    pub identifier: Option<EditIdentifier>,
    /// Range to replace (empty range = pure insertion).
    pub range: Range,
    /// Replacement text (empty = pure deletion).
    pub text: String,
    /// Force markers at the edit boundary to move with the inserted text,
    /// overriding [`MarkerStickiness::ToPrevious`].
    pub force_move_markers: bool,
    /// Marks automatically inserted whitespace (kept for auto-indent
    /// integrations layered above this engine).
    pub is_auto_whitespace: bool,
}

impl EditOperation {
    /// A plain replacement with no marker forcing.
    pub fn replace(identifier: Option<EditIdentifier>, range: Range, text: impl Into<String>) -> Self {
        Self {
            identifier,
            range,
            text: text.into(),
            force_move_markers: false,
            is_auto_whitespace: false,
        }
    }
}

/// The inverse of an applied [`EditOperation`], reported by the buffer.
///
/// `range` covers the inserted text in post-edit coordinates; applying
/// `text` over that range would revert the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseEdit {
    /// Identifier of the forward edit this reverses.
    pub identifier: Option<EditIdentifier>,
    /// Range of the inserted text in the post-edit buffer.
    pub range: Range,
    /// The text the forward edit deleted.
    pub text: String,
}

/// Opaque handle to a buffer-owned sticky position marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub(crate) u64);

/// How a marker sitting exactly at an insertion point reacts to the insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStickiness {
    /// The marker ends up after the inserted text (moves with typing).
    ToNext,
    /// The marker stays before the inserted text.
    ToPrevious,
}

/// Callback computing post-edit selections from the buffer's reverse edits.
///
/// Invoked by [`CursorBuffer::push_edit_operations`] after the edits are
/// applied but before the undo element is sealed, so the selections it returns
/// are recorded as the transaction's "after" cursor state.
pub type ComputeSelectionsFn<'a> =
    &'a mut dyn FnMut(&dyn CursorBuffer, &[ReverseEdit]) -> Vec<Selection>;

/// Text buffer collaborator consumed by the cursor engine.
pub trait CursorBuffer {
    /// Total number of lines (at least 1; an empty buffer has one empty line).
    fn line_count(&self) -> usize;

    /// Content of the 1-based `line`, without its line break. Out-of-range
    /// lines yield an empty string.
    fn line_content(&self, line: usize) -> String;

    /// `utf16_length + 1` of the 1-based `line`, i.e. the largest valid
    /// column on it.
    fn line_max_column(&self, line: usize) -> usize;

    /// Clamp `position` to the buffer: line into `1..=line_count`, column into
    /// `1..=line_max_column`, snapped off surrogate-pair interiors.
    fn validate_position(&self, position: Position) -> Position;

    /// Validate both endpoints of `range`.
    fn validate_range(&self, range: Range) -> Range {
        Range::new(
            self.validate_position(range.start),
            self.validate_position(range.end),
        )
    }

    /// Validate a selection, preserving its direction.
    fn validate_selection(&self, selection: Selection) -> Selection {
        Selection::from_anchor_active(
            self.validate_position(selection.anchor()),
            self.validate_position(selection.active()),
        )
    }

    /// The restricted editable region, if one is set. `None` means the whole
    /// buffer is editable.
    fn editable_range(&self) -> Option<Range>;

    /// Apply `edits` as one atomic transaction.
    ///
    /// - `before` is the cursor state recorded for undo.
    /// - All edit ranges are interpreted against the pre-transaction buffer;
    ///   the buffer applies them simultaneously (no edit sees another's
    ///   effect).
    /// - `compute_after` receives the post-edit buffer and the reverse edits
    ///   (same order as `edits`); its return value is recorded as the
    ///   post-transaction cursor state and returned to the caller.
    ///
    /// Either every edit applies or none does; edit ranges must not overlap
    /// (the caller arbitrates conflicts beforehand).
    fn push_edit_operations(
        &mut self,
        before: &[Selection],
        edits: Vec<EditOperation>,
        compute_after: ComputeSelectionsFn<'_>,
    ) -> Vec<Selection>;

    /// Close the current undo group; the next transaction starts a new one.
    fn push_stack_element(&mut self);

    /// Undo the most recent undo group. Returns the selections recorded
    /// before that group, or `None` if there is nothing to undo.
    fn undo(&mut self) -> Option<Vec<Selection>>;

    /// Redo the most recently undone group. Returns the selections recorded
    /// after that group, or `None` if there is nothing to redo.
    fn redo(&mut self) -> Option<Vec<Selection>>;

    /// Create a sticky marker at `position`.
    fn add_marker(&mut self, position: Position, stickiness: MarkerStickiness) -> MarkerId;

    /// Current position of a marker, if it still exists.
    fn marker_position(&self, id: MarkerId) -> Option<Position>;

    /// Delete a marker. Unknown ids are ignored.
    fn remove_marker(&mut self, id: MarkerId);

    /// Monotonically increasing content version. Bumped by every transaction
    /// and by external content replacement.
    fn version(&self) -> u64;
}
