//! Reference buffer implementation.
//!
//! [`TextModel`] backs the [`CursorBuffer`] trait with a rope. It is the
//! buffer used by this crate's tests and benchmarks and a reasonable default
//! for embedders that do not bring their own storage.
//!
//! # Transaction semantics
//!
//! Edits inside one [`push_edit_operations`](CursorBuffer::push_edit_operations)
//! call are applied *simultaneously*: every range is interpreted against the
//! pre-transaction text, the model sorts the edits and applies them from the
//! highest offset down, and post-edit positions are recovered by walking the
//! edits in ascending order with a running length delta. Sticky markers are
//! carried through the same walk.
//!
//! # Undo model
//!
//! Transactions accumulate into the open undo element until
//! [`push_stack_element`](CursorBuffer::push_stack_element) seals it, so one
//! user action (e.g. a multi-cursor type) stays one undo step regardless of
//! how many transactions it issued. Each element records the selections
//! before and after, which `undo()`/`redo()` hand back verbatim.

use std::collections::HashMap;

use ropey::Rope;

use crate::buffer::{
    ComputeSelectionsFn, CursorBuffer, EditOperation, MarkerId, MarkerStickiness, ReverseEdit,
};
use crate::position::{Position, Range};
use crate::selection::Selection;
use crate::text;

const MAX_UNDO_ELEMENTS: usize = 1000;

#[derive(Debug, Clone)]
struct StoredEdit {
    /// Char offset of the edit in its transaction's pre-edit text.
    start_before: usize,
    /// Char offset of the edit in its transaction's post-edit text.
    start_after: usize,
    deleted: String,
    inserted: String,
}

impl StoredEdit {
    fn deleted_len(&self) -> usize {
        self.deleted.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }
}

/// One atomic batch of simultaneous edits.
#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<StoredEdit>,
}

/// One undo step: every transaction since the previous stack boundary.
#[derive(Debug, Clone)]
struct UndoElement {
    before: Vec<Selection>,
    after: Vec<Selection>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Clone)]
struct Marker {
    offset: usize,
    stickiness: MarkerStickiness,
}

/// Rope-backed text buffer with undo groups, sticky markers, and an optional
/// restricted editable range.
pub struct TextModel {
    rope: Rope,
    editable_range: Option<Range>,
    markers: HashMap<u64, Marker>,
    next_marker_id: u64,
    undo_stack: Vec<UndoElement>,
    redo_stack: Vec<UndoElement>,
    /// Whether the top of the undo stack still accepts new transactions.
    element_open: bool,
    version: u64,
}

impl TextModel {
    /// Create a model holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            editable_range: None,
            markers: HashMap::new(),
            next_marker_id: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            element_open: false,
            version: 0,
        }
    }

    /// Create a model from individual lines joined with `'\n'`.
    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(&lines.join("\n"))
    }

    /// Full text content.
    pub fn get_text(&self) -> String {
        self.rope.to_string()
    }

    /// All lines, without line breaks.
    pub fn get_lines(&self) -> Vec<String> {
        (1..=self.line_count())
            .map(|line| self.line_content(line))
            .collect()
    }

    /// Replace the entire content out-of-band (a "content flush").
    ///
    /// Clears undo/redo history and all markers and bumps the version; the
    /// cursor engine reacts by rebuilding its cursor collection.
    pub fn set_value(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.markers.clear();
        self.element_open = false;
        self.version += 1;
    }

    /// Restrict edits to `range` (validated), or lift the restriction with
    /// `None`.
    pub fn set_editable_range(&mut self, range: Option<Range>) {
        self.editable_range = range.map(|r| self.validate_range(r));
    }

    /// `true` if there is an undo element to pop.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// `true` if there is a redo element to pop.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth in elements (user-visible undo steps).
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn char_offset_of(&self, position: Position) -> usize {
        let position = self.validate_position(position);
        let line_start = self.rope.line_to_char(position.line - 1);
        line_start + text::char_offset_of_column(&self.line_content(position.line), position.column)
    }

    fn position_of(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_offset);
        let line_start = self.rope.line_to_char(line);
        let column =
            text::column_of_char_offset(&self.line_content(line + 1), char_offset - line_start);
        Position::new(line + 1, column)
    }

    /// Transform a marker offset through one transaction's edits (ascending,
    /// pre-edit coordinates).
    fn transform_offset(
        offset: usize,
        stickiness: MarkerStickiness,
        ops: &[(usize, usize, usize, bool)],
    ) -> usize {
        let mut anchor = offset;
        let mut delta: i64 = 0;
        for &(start, del_len, ins_len, force) in ops {
            let end = start + del_len;
            if anchor < start {
                break;
            }
            if anchor > end {
                delta += ins_len as i64 - del_len as i64;
                continue;
            }
            // Marker sits on the edit.
            if anchor == start && del_len == 0 {
                if stickiness == MarkerStickiness::ToNext || force {
                    delta += ins_len as i64;
                }
            } else if anchor == start {
                // Deletion starts at the marker; it stays put.
            } else {
                // Inside or at the end of the deleted range: collapse to the
                // start, then honor stickiness against the inserted text.
                anchor = start;
                if anchor < offset && (stickiness == MarkerStickiness::ToNext || force) {
                    delta += ins_len as i64;
                }
            }
            break;
        }
        (anchor as i64 + delta).max(0) as usize
    }

    /// Apply one transaction of simultaneous edits given as
    /// `(start, del_len, insert_text)` in ascending pre-edit char offsets.
    /// Returns the per-edit post-edit start offsets, in the same order.
    fn apply_ops(&mut self, ops: &[(usize, usize, String)]) -> Vec<usize> {
        // Post-edit starts via ascending walk with a running delta.
        let mut starts_after = Vec::with_capacity(ops.len());
        let mut delta: i64 = 0;
        for (start, del_len, insert) in ops {
            starts_after.push((*start as i64 + delta) as usize);
            delta += insert.chars().count() as i64 - *del_len as i64;
        }

        // Mutate from the highest offset down so earlier offsets stay valid.
        for (start, del_len, insert) in ops.iter().rev() {
            if *del_len > 0 {
                self.rope.remove(*start..*start + *del_len);
            }
            if !insert.is_empty() {
                self.rope.insert(*start, insert);
            }
        }

        // Carry markers across the transaction.
        let marker_ops: Vec<(usize, usize, usize, bool)> = ops
            .iter()
            .map(|(start, del_len, insert)| (*start, *del_len, insert.chars().count(), false))
            .collect();
        for marker in self.markers.values_mut() {
            marker.offset = Self::transform_offset(marker.offset, marker.stickiness, &marker_ops);
        }

        self.version += 1;
        starts_after
    }
}

impl CursorBuffer for TextModel {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_content(&self, line: usize) -> String {
        if line == 0 || line > self.rope.len_lines() {
            return String::new();
        }
        let content = self.rope.line(line - 1).to_string();
        let content = content.strip_suffix('\n').unwrap_or(&content);
        content.strip_suffix('\r').unwrap_or(content).to_string()
    }

    fn line_max_column(&self, line: usize) -> usize {
        text::utf16_len(&self.line_content(line)) + 1
    }

    fn validate_position(&self, position: Position) -> Position {
        let line = position.line.clamp(1, self.line_count().max(1));
        let column = text::snap_column(&self.line_content(line), position.column);
        Position::new(line, column)
    }

    fn editable_range(&self) -> Option<Range> {
        self.editable_range
    }

    fn push_edit_operations(
        &mut self,
        before: &[Selection],
        edits: Vec<EditOperation>,
        compute_after: ComputeSelectionsFn<'_>,
    ) -> Vec<Selection> {
        // Resolve ranges to char offsets against the pre-transaction text.
        struct Pending {
            input_index: usize,
            start: usize,
            del_len: usize,
            text: String,
            identifier: Option<crate::buffer::EditIdentifier>,
            force_move_markers: bool,
        }

        let mut pending: Vec<Pending> = edits
            .into_iter()
            .enumerate()
            .map(|(input_index, edit)| {
                let range = self.validate_range(edit.range);
                let start = self.char_offset_of(range.start);
                let end = self.char_offset_of(range.end);
                Pending {
                    input_index,
                    start,
                    del_len: end - start,
                    text: edit.text,
                    identifier: edit.identifier,
                    force_move_markers: edit.force_move_markers,
                }
            })
            .collect();
        pending.sort_by_key(|p| (p.start, p.input_index));

        let mut ops: Vec<(usize, usize, String)> = Vec::with_capacity(pending.len());
        let mut deleted: Vec<String> = Vec::with_capacity(pending.len());
        let mut forced: Vec<bool> = Vec::with_capacity(pending.len());
        for p in &pending {
            let removed = if p.del_len == 0 {
                String::new()
            } else {
                self.rope.slice(p.start..p.start + p.del_len).to_string()
            };
            deleted.push(removed);
            forced.push(p.force_move_markers);
            ops.push((p.start, p.del_len, p.text.clone()));
        }

        // Respect per-edit force_move_markers during the marker walk by
        // splitting the apply: run the shared path, then re-run forcing for
        // the flagged edits only (markers are few and transient).
        let force_ops: Vec<(usize, usize, usize, bool)> = ops
            .iter()
            .zip(&forced)
            .map(|((start, del_len, insert), force)| {
                (*start, *del_len, insert.chars().count(), *force)
            })
            .collect();
        let marker_snapshot: Vec<(u64, usize, MarkerStickiness)> = self
            .markers
            .iter()
            .map(|(id, m)| (*id, m.offset, m.stickiness))
            .collect();

        let starts_after = self.apply_ops(&ops);

        if forced.iter().any(|f| *f) {
            for (id, offset, stickiness) in marker_snapshot {
                let transformed = Self::transform_offset(offset, stickiness, &force_ops);
                if let Some(marker) = self.markers.get_mut(&id) {
                    marker.offset = transformed;
                }
            }
        }

        // Record the transaction for undo replay (ascending order).
        let stored: Vec<StoredEdit> = pending
            .iter()
            .zip(&deleted)
            .zip(&starts_after)
            .map(|((p, removed), start_after)| StoredEdit {
                start_before: p.start,
                start_after: *start_after,
                deleted: removed.clone(),
                inserted: p.text.clone(),
            })
            .collect();

        // Reverse edits reported in the caller's original edit order.
        let mut reverse: Vec<(usize, ReverseEdit)> = pending
            .iter()
            .zip(&deleted)
            .zip(&starts_after)
            .map(|((p, removed), start_after)| {
                let inserted_len = p.text.chars().count();
                let range = Range::new(
                    self.position_of(*start_after),
                    self.position_of(*start_after + inserted_len),
                );
                (
                    p.input_index,
                    ReverseEdit {
                        identifier: p.identifier,
                        range,
                        text: removed.clone(),
                    },
                )
            })
            .collect();
        reverse.sort_by_key(|(input_index, _)| *input_index);
        let reverse: Vec<ReverseEdit> = reverse.into_iter().map(|(_, e)| e).collect();

        let after = compute_after(&*self, &reverse);

        self.redo_stack.clear();
        let transaction = Transaction { edits: stored };
        match self.undo_stack.last_mut() {
            Some(element) if self.element_open => {
                element.transactions.push(transaction);
                element.after = after.clone();
            }
            _ => {
                if self.undo_stack.len() >= MAX_UNDO_ELEMENTS {
                    self.undo_stack.remove(0);
                }
                self.undo_stack.push(UndoElement {
                    before: before.to_vec(),
                    after: after.clone(),
                    transactions: vec![transaction],
                });
                self.element_open = true;
            }
        }

        after
    }

    fn push_stack_element(&mut self) {
        self.element_open = false;
    }

    fn undo(&mut self) -> Option<Vec<Selection>> {
        self.element_open = false;
        let element = self.undo_stack.pop()?;

        // Revert transactions newest-first; each inverse runs in the exact
        // text state its coordinates refer to.
        for transaction in element.transactions.iter().rev() {
            let ops: Vec<(usize, usize, String)> = transaction
                .edits
                .iter()
                .map(|e| (e.start_after, e.inserted_len(), e.deleted.clone()))
                .collect();
            self.apply_ops(&ops);
        }

        let before = element.before.clone();
        self.redo_stack.push(element);
        Some(before)
    }

    fn redo(&mut self) -> Option<Vec<Selection>> {
        self.element_open = false;
        let element = self.redo_stack.pop()?;

        for transaction in &element.transactions {
            let ops: Vec<(usize, usize, String)> = transaction
                .edits
                .iter()
                .map(|e| (e.start_before, e.deleted_len(), e.inserted.clone()))
                .collect();
            self.apply_ops(&ops);
        }

        let after = element.after.clone();
        self.undo_stack.push(element);
        Some(after)
    }

    fn add_marker(&mut self, position: Position, stickiness: MarkerStickiness) -> MarkerId {
        let id = self.next_marker_id;
        self.next_marker_id += 1;
        let offset = self.char_offset_of(position);
        self.markers.insert(id, Marker { offset, stickiness });
        MarkerId(id)
    }

    fn marker_position(&self, id: MarkerId) -> Option<Position> {
        self.markers.get(&id.0).map(|m| self.position_of(m.offset))
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id.0);
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Selection;

    fn no_selections(_: &dyn CursorBuffer, _: &[ReverseEdit]) -> Vec<Selection> {
        Vec::new()
    }

    #[test]
    fn test_line_addressing() {
        let model = TextModel::new("foo\nbar\n");
        assert_eq!(model.line_count(), 3);
        assert_eq!(model.line_content(1), "foo");
        assert_eq!(model.line_content(2), "bar");
        assert_eq!(model.line_content(3), "");
        assert_eq!(model.line_max_column(1), 4);
    }

    #[test]
    fn test_validate_position_clamps_and_snaps() {
        let model = TextModel::new("a😀b");
        assert_eq!(model.validate_position(Position::new(5, 1)), Position::new(1, 1));
        assert_eq!(model.validate_position(Position::new(1, 3)), Position::new(1, 2));
        assert_eq!(model.validate_position(Position::new(1, 99)), Position::new(1, 5));
    }

    #[test]
    fn test_simultaneous_edits_apply_against_pre_edit_text() {
        let mut model = TextModel::new("foo\nbar");
        let edits = vec![
            EditOperation::replace(
                None,
                Range::collapsed(Position::new(1, 4)),
                "X",
            ),
            EditOperation::replace(
                None,
                Range::collapsed(Position::new(2, 4)),
                "X",
            ),
        ];
        let mut compute = no_selections;
        model.push_edit_operations(&[], edits, &mut compute);
        assert_eq!(model.get_text(), "fooX\nbarX");
    }

    #[test]
    fn test_reverse_edit_covers_inserted_text() {
        let mut model = TextModel::new("hello");
        let edits = vec![EditOperation::replace(
            None,
            Range::new(Position::new(1, 1), Position::new(1, 6)),
            "bye",
        )];
        let mut seen = Vec::new();
        let mut compute = |_: &dyn CursorBuffer, reverse: &[ReverseEdit]| {
            seen = reverse.to_vec();
            Vec::new()
        };
        model.push_edit_operations(&[], edits, &mut compute);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "hello");
        assert_eq!(
            seen[0].range,
            Range::new(Position::new(1, 1), Position::new(1, 4))
        );
        assert_eq!(model.get_text(), "bye");
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut model = TextModel::new("foo");
        let before = vec![Selection::caret(Position::new(1, 4))];
        let mut compute = |_: &dyn CursorBuffer, _: &[ReverseEdit]| {
            vec![Selection::caret(Position::new(1, 5))]
        };
        model.push_edit_operations(
            &before,
            vec![EditOperation::replace(
                None,
                Range::collapsed(Position::new(1, 4)),
                "X",
            )],
            &mut compute,
        );
        assert_eq!(model.get_text(), "fooX");

        let restored = model.undo().expect("one element");
        assert_eq!(model.get_text(), "foo");
        assert_eq!(restored, before);

        let redone = model.redo().expect("one element");
        assert_eq!(model.get_text(), "fooX");
        assert_eq!(redone, vec![Selection::caret(Position::new(1, 5))]);
    }

    #[test]
    fn test_transactions_group_until_stack_boundary() {
        let mut model = TextModel::new("");
        let mut compute = no_selections;
        for ch in ["a", "b", "c"] {
            model.push_edit_operations(
                &[],
                vec![EditOperation::replace(
                    None,
                    Range::collapsed(Position::new(1, model.line_max_column(1))),
                    ch,
                )],
                &mut compute,
            );
        }
        assert_eq!(model.get_text(), "abc");
        assert_eq!(model.undo_depth(), 1);

        model.push_stack_element();
        model.push_edit_operations(
            &[],
            vec![EditOperation::replace(
                None,
                Range::collapsed(Position::new(1, 4)),
                "d",
            )],
            &mut compute,
        );
        assert_eq!(model.undo_depth(), 2);

        model.undo();
        assert_eq!(model.get_text(), "abc");
        model.undo();
        assert_eq!(model.get_text(), "");
    }

    #[test]
    fn test_marker_stickiness() {
        let mut model = TextModel::new("ab");
        let to_next = model.add_marker(Position::new(1, 2), MarkerStickiness::ToNext);
        let to_prev = model.add_marker(Position::new(1, 2), MarkerStickiness::ToPrevious);

        let mut compute = no_selections;
        model.push_edit_operations(
            &[],
            vec![EditOperation::replace(
                None,
                Range::collapsed(Position::new(1, 2)),
                "XY",
            )],
            &mut compute,
        );
        assert_eq!(model.get_text(), "aXYb");
        assert_eq!(model.marker_position(to_next), Some(Position::new(1, 4)));
        assert_eq!(model.marker_position(to_prev), Some(Position::new(1, 2)));

        model.remove_marker(to_next);
        assert_eq!(model.marker_position(to_next), None);
    }

    #[test]
    fn test_set_value_flush_clears_history() {
        let mut model = TextModel::new("x");
        let mut compute = no_selections;
        model.push_edit_operations(
            &[],
            vec![EditOperation::replace(
                None,
                Range::collapsed(Position::new(1, 2)),
                "y",
            )],
            &mut compute,
        );
        let v = model.version();
        model.set_value("fresh");
        assert!(model.version() > v);
        assert!(!model.can_undo());
        assert_eq!(model.get_text(), "fresh");
    }
}
