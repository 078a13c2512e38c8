//! Editing commands.
//!
//! A [`Command`] couples the two halves of one cursor's contribution to an
//! edit intent: producing the raw text replacements, and recomputing where the
//! cursor lands once the buffer has applied them. The execution pipeline calls
//! [`edits`](Command::edits) before the transaction and
//! [`result_selection`](Command::result_selection) after it, feeding the
//! latter the buffer's reverse edits and any resolved tracked selections.
//!
//! Most operations are served by [`ReplaceCommand`] (cursor lands at the end
//! of the inserted text, which also covers deletions). Operations whose final
//! cursor cannot be derived from their own edit range register a *tracked
//! selection* instead: the pipeline turns it into sticky buffer markers that
//! survive the transaction ([`TrackedReplaceCommand`]).

use crate::buffer::{CursorBuffer, EditIdentifier, EditOperation, MarkerStickiness, ReverseEdit};
use crate::error::CursorError;
use crate::position::{Position, Range};
use crate::selection::Selection;
use crate::text;

/// Handle to a tracked selection registered on an [`EditBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedHandle(pub(crate) usize);

/// A request to carry a selection through the transaction via markers.
#[derive(Debug, Clone)]
pub struct TrackedSelectionRequest {
    /// The selection to track.
    pub selection: Selection,
    /// Stickiness applied to both endpoint markers.
    pub stickiness: MarkerStickiness,
}

/// Collects one cursor's edits, assigning `(major, minor)` identifiers.
#[derive(Debug)]
pub struct EditBatch {
    major: usize,
    edits: Vec<EditOperation>,
    tracked: Vec<TrackedSelectionRequest>,
}

impl EditBatch {
    pub(crate) fn new(major: usize) -> Self {
        Self { major, edits: Vec::new(), tracked: Vec::new() }
    }

    /// Emit a text replacement.
    pub fn add_edit(&mut self, range: Range, text: impl Into<String>) {
        let minor = self.edits.len();
        self.edits.push(EditOperation::replace(
            Some(EditIdentifier { major: self.major, minor }),
            range,
            text,
        ));
    }

    /// Emit a replacement whose boundary markers always move with the
    /// inserted text.
    pub fn add_edit_forcing_markers(&mut self, range: Range, text: impl Into<String>) {
        let minor = self.edits.len();
        let mut edit = EditOperation::replace(
            Some(EditIdentifier { major: self.major, minor }),
            range,
            text,
        );
        edit.force_move_markers = true;
        self.edits.push(edit);
    }

    /// Register a selection to recover after the transaction through sticky
    /// markers.
    pub fn track_selection(
        &mut self,
        selection: Selection,
        stickiness: MarkerStickiness,
    ) -> TrackedHandle {
        self.tracked.push(TrackedSelectionRequest { selection, stickiness });
        TrackedHandle(self.tracked.len() - 1)
    }

    pub(crate) fn into_parts(self) -> (Vec<EditOperation>, Vec<TrackedSelectionRequest>) {
        (self.edits, self.tracked)
    }
}

/// What the pipeline hands a command after the buffer transaction.
#[derive(Debug)]
pub struct TransactionOutcome<'a> {
    /// This cursor's reverse edits, sorted by minor sequence number.
    pub reverse_edits: &'a [ReverseEdit],
    /// Resolved tracked selections, indexed by [`TrackedHandle`].
    pub tracked_selections: &'a [Selection],
}

impl TransactionOutcome<'_> {
    /// The resolved selection for a tracked handle.
    pub fn tracked(&self, handle: TrackedHandle) -> Option<Selection> {
        self.tracked_selections.get(handle.0).copied()
    }
}

/// One cursor's edit-generation and cursor-recomputation logic.
pub trait Command {
    /// Emit this command's text replacements (and tracked selections) into
    /// `batch`. A failing command contributes nothing; the pipeline drops its
    /// cursor from the intent and continues with the others.
    fn edits(&self, buffer: &dyn CursorBuffer, batch: &mut EditBatch) -> Result<(), CursorError>;

    /// The selection this command's cursor should have after the transaction.
    fn result_selection(
        &self,
        buffer: &dyn CursorBuffer,
        outcome: &TransactionOutcome<'_>,
    ) -> Selection;
}

/// Replace a range with text; the cursor lands at the end of the inserted
/// text (for deletions: at the deletion point).
#[derive(Debug, Clone)]
pub struct ReplaceCommand {
    /// Range to replace.
    pub range: Range,
    /// Replacement text.
    pub text: String,
    /// Whether boundary markers must follow the inserted text.
    pub force_move_markers: bool,
}

impl ReplaceCommand {
    /// Create a replace command.
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self { range, text: text.into(), force_move_markers: false }
    }

    /// Create a replace command whose boundary markers follow the inserted
    /// text (paste semantics).
    pub fn forcing_markers(range: Range, text: impl Into<String>) -> Self {
        Self { range, text: text.into(), force_move_markers: true }
    }
}

impl Command for ReplaceCommand {
    fn edits(&self, _buffer: &dyn CursorBuffer, batch: &mut EditBatch) -> Result<(), CursorError> {
        if self.force_move_markers {
            batch.add_edit_forcing_markers(self.range, self.text.clone());
        } else {
            batch.add_edit(self.range, self.text.clone());
        }
        Ok(())
    }

    fn result_selection(
        &self,
        buffer: &dyn CursorBuffer,
        outcome: &TransactionOutcome<'_>,
    ) -> Selection {
        match outcome.reverse_edits.last() {
            Some(reverse) => Selection::caret(reverse.range.end),
            None => Selection::caret(buffer.validate_position(self.range.start)),
        }
    }
}

/// Replace a range while recovering the cursor from a tracked selection
/// rather than from the edit itself.
///
/// Used when the cursor's final location depends on text outside the edited
/// range, e.g. whole-line paste where the insertion happens at the line start
/// but the caret must keep its place in the line that moved down.
#[derive(Debug, Clone)]
pub struct TrackedReplaceCommand {
    /// Range to replace.
    pub range: Range,
    /// Replacement text.
    pub text: String,
    /// The selection to carry across the edit.
    pub tracked: Selection,
}

impl Command for TrackedReplaceCommand {
    fn edits(&self, _buffer: &dyn CursorBuffer, batch: &mut EditBatch) -> Result<(), CursorError> {
        batch.add_edit(self.range, self.text.clone());
        batch.track_selection(self.tracked, MarkerStickiness::ToNext);
        Ok(())
    }

    fn result_selection(
        &self,
        buffer: &dyn CursorBuffer,
        outcome: &TransactionOutcome<'_>,
    ) -> Selection {
        match outcome.tracked(TrackedHandle(0)) {
            Some(selection) => selection,
            None => match outcome.reverse_edits.last() {
                Some(reverse) => Selection::caret(reverse.range.end),
                None => Selection::caret(buffer.validate_position(self.range.start)),
            },
        }
    }
}

/// Indent or outdent every line covered by a selection by one indent unit,
/// shifting the selection's columns with the edited whitespace.
#[derive(Debug, Clone)]
pub struct ShiftLinesCommand {
    /// The cursor's selection; decides the affected lines and the result.
    pub selection: Selection,
    /// One indentation level (a tab, or `tab_size` spaces).
    pub unit: String,
    /// `true` removes up to one unit of leading whitespace instead of adding.
    pub outdent: bool,
}

impl ShiftLinesCommand {
    fn affected_lines(&self) -> (usize, usize) {
        let range = self.selection.range;
        let mut end_line = range.end.line;
        // A selection ending at column 1 does not indent its final line.
        if !range.is_empty() && range.end.column == 1 && end_line > range.start.line {
            end_line -= 1;
        }
        (range.start.line, end_line)
    }

    /// Leading whitespace to strip from `content` for one outdent step: a
    /// whole tab, or up to `unit_cells` spaces.
    fn outdent_prefix_len(content: &str, unit_cells: usize) -> usize {
        let mut chars = content.chars();
        match chars.next() {
            Some('\t') => 1,
            Some(' ') => {
                let mut len = 1;
                for ch in chars.take(unit_cells.saturating_sub(1)) {
                    if ch != ' ' {
                        break;
                    }
                    len += 1;
                }
                len
            }
            _ => 0,
        }
    }

    fn shift_endpoint(&self, endpoint: Position, outcome: &TransactionOutcome<'_>) -> Position {
        let Some(reverse) = outcome
            .reverse_edits
            .iter()
            .find(|e| e.range.start.line == endpoint.line)
        else {
            return endpoint;
        };
        // Indent edits never span lines, so the inserted width is the span of
        // the reverse range on its line.
        let inserted = if reverse.range.start.line == reverse.range.end.line {
            reverse.range.end.column - reverse.range.start.column
        } else {
            0
        };
        let deleted = reverse.text.chars().map(char::len_utf16).sum::<usize>();
        if self.outdent {
            Position::new(endpoint.line, endpoint.column.saturating_sub(deleted).max(1))
        } else if endpoint.column == 1 {
            endpoint
        } else {
            Position::new(endpoint.line, endpoint.column + inserted)
        }
    }
}

impl Command for ShiftLinesCommand {
    fn edits(&self, buffer: &dyn CursorBuffer, batch: &mut EditBatch) -> Result<(), CursorError> {
        let (first, last) = self.affected_lines();
        let unit_cells = self.unit.chars().count();
        for line in first..=last {
            let content = buffer.line_content(line);
            if self.outdent {
                let strip = Self::outdent_prefix_len(&content, unit_cells);
                if strip > 0 {
                    let end_column = text::column_of_char_offset(&content, strip);
                    batch.add_edit(
                        Range::new(Position::new(line, 1), Position::new(line, end_column)),
                        "",
                    );
                }
            } else {
                if content.is_empty() {
                    continue;
                }
                batch.add_edit(Range::collapsed(Position::new(line, 1)), self.unit.clone());
            }
        }
        Ok(())
    }

    fn result_selection(
        &self,
        _buffer: &dyn CursorBuffer,
        outcome: &TransactionOutcome<'_>,
    ) -> Selection {
        Selection::from_anchor_active(
            self.shift_endpoint(self.selection.anchor(), outcome),
            self.shift_endpoint(self.selection.active(), outcome),
        )
    }
}
