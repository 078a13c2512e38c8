//! Edit operation builders.
//!
//! Pure functions that turn one cursor's selection plus an editing intent into
//! an [`EditOperationResult`]: the command to run (if any) and the undo/reveal
//! policy around it. The execution pipeline fans these out across all cursors
//! and arbitrates the collected edits; nothing here touches the buffer.

use crate::buffer::CursorBuffer;
use crate::commands::{Command, ReplaceCommand, ShiftLinesCommand, TrackedReplaceCommand};
use crate::config::CursorConfig;
use crate::movement::{cell_width_at, visible_column_from_column};
use crate::position::{Position, Range};
use crate::selection::Selection;
use crate::text;

/// A command plus its execution policy, produced per cursor per intent.
pub struct EditOperationResult {
    /// The command to execute, or `None` when the cursor has nothing to do.
    pub command: Option<Box<dyn Command>>,
    /// Seal the current undo group before executing.
    pub should_push_stack_element_before: bool,
    /// Seal the undo group after executing.
    pub should_push_stack_element_after: bool,
    /// Whether the edit is automatically inserted whitespace.
    pub is_auto_whitespace: bool,
    /// Whether the post-edit reveal should also scroll horizontally.
    pub should_reveal_horizontal: bool,
}

impl EditOperationResult {
    fn new(command: Box<dyn Command>) -> Self {
        Self {
            command: Some(command),
            should_push_stack_element_before: false,
            should_push_stack_element_after: false,
            is_auto_whitespace: false,
            should_reveal_horizontal: true,
        }
    }

    fn no_op() -> Self {
        Self {
            command: None,
            should_push_stack_element_before: false,
            should_push_stack_element_after: false,
            is_auto_whitespace: false,
            should_reveal_horizontal: true,
        }
    }

    fn sealed(mut self, before: bool, after: bool) -> Self {
        self.should_push_stack_element_before = before;
        self.should_push_stack_element_after = after;
        self
    }
}

/// Type `text` over the cursor's selection. Consecutive typing coalesces into
/// one undo group; the pipeline dispatches multi-character input one character
/// at a time (unless composing) so interceptors observe single keystrokes.
pub fn type_text(
    _config: &CursorConfig,
    _buffer: &dyn CursorBuffer,
    selection: &Selection,
    text: &str,
) -> EditOperationResult {
    EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, text)))
}

/// Replace `replace_prev` code points before the caret (and `replace_next`
/// after it) with composed text. Used for IME composition updates, which must
/// bypass per-character interception.
pub fn compose(
    _config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    selection: &Selection,
    text: &str,
    replace_prev: usize,
    replace_next: usize,
) -> EditOperationResult {
    let caret = selection.active();
    let content = buffer.line_content(caret.line);
    let mut start_column = caret.column;
    for _ in 0..replace_prev {
        match text::prev_column(&content, start_column) {
            Some(col) => start_column = col,
            None => break,
        }
    }
    let mut end_column = caret.column;
    for _ in 0..replace_next {
        match text::next_column(&content, end_column) {
            Some(col) => end_column = col,
            None => break,
        }
    }
    let range = Range::new(
        Position::new(caret.line, start_column),
        Position::new(caret.line, end_column),
    );
    EditOperationResult::new(Box::new(ReplaceCommand::new(range, text)))
}

/// Insert a line break at the cursor. Language-aware indentation is a
/// collaborator concern; the break itself is inserted verbatim.
pub fn insert_line_break(
    _config: &CursorConfig,
    _buffer: &dyn CursorBuffer,
    selection: &Selection,
) -> EditOperationResult {
    EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, "\n")))
        .sealed(true, false)
}

/// Delete one code point to the left, merging with the previous line at
/// column 1. A non-empty selection is simply removed.
pub fn delete_left(
    _config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    selection: &Selection,
) -> EditOperationResult {
    if !selection.is_empty() {
        return EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, "")))
            .sealed(true, false);
    }
    let caret = selection.active();
    let content = buffer.line_content(caret.line);
    let range = match text::prev_column(&content, caret.column) {
        Some(col) => Range::new(Position::new(caret.line, col), caret),
        None if caret.line > 1 => Range::new(
            Position::new(caret.line - 1, buffer.line_max_column(caret.line - 1)),
            Position::new(caret.line, 1),
        ),
        None => return EditOperationResult::no_op(),
    };
    EditOperationResult::new(Box::new(ReplaceCommand::new(range, "")))
}

/// Delete one code point to the right, merging with the next line at
/// end-of-line. A non-empty selection is simply removed.
pub fn delete_right(
    _config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    selection: &Selection,
) -> EditOperationResult {
    if !selection.is_empty() {
        return EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, "")))
            .sealed(true, false);
    }
    let caret = selection.active();
    let content = buffer.line_content(caret.line);
    let range = match text::next_column(&content, caret.column) {
        Some(col) => Range::new(caret, Position::new(caret.line, col)),
        None if caret.line < buffer.line_count() => {
            Range::new(caret, Position::new(caret.line + 1, 1))
        }
        None => return EditOperationResult::no_op(),
    };
    EditOperationResult::new(Box::new(ReplaceCommand::new(range, "")))
}

/// The deletion half of a cut. With an empty selection and
/// `empty_selection_clipboard` enabled, the whole line goes (including its
/// line break); the clipboard half lives upstream.
pub fn cut(
    config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    selection: &Selection,
) -> EditOperationResult {
    if !selection.is_empty() {
        return EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, "")))
            .sealed(true, true);
    }
    if !config.empty_selection_clipboard {
        return EditOperationResult::no_op();
    }
    let line = selection.active().line;
    let range = if line < buffer.line_count() {
        Range::new(Position::new(line, 1), Position::new(line + 1, 1))
    } else if line > 1 {
        // Last line: take the preceding line break instead of a trailing one.
        Range::new(
            Position::new(line - 1, buffer.line_max_column(line - 1)),
            Position::new(line, buffer.line_max_column(line)),
        )
    } else {
        Range::new(Position::new(1, 1), Position::new(1, buffer.line_max_column(1)))
    };
    if range.is_empty() {
        return EditOperationResult::no_op();
    }
    EditOperationResult::new(Box::new(ReplaceCommand::new(range, ""))).sealed(true, true)
}

/// Indent every line the selection covers by one unit.
pub fn indent(config: &CursorConfig, selection: &Selection) -> EditOperationResult {
    EditOperationResult::new(Box::new(ShiftLinesCommand {
        selection: *selection,
        unit: config.indent_unit(),
        outdent: false,
    }))
    .sealed(true, true)
}

/// Remove up to one unit of leading whitespace from every line the selection
/// covers.
pub fn outdent(config: &CursorConfig, selection: &Selection) -> EditOperationResult {
    EditOperationResult::new(Box::new(ShiftLinesCommand {
        selection: *selection,
        unit: config.indent_unit(),
        outdent: true,
    }))
    .sealed(true, true)
}

/// Tab key: a multi-line selection indents; otherwise insert a tab (or spaces
/// up to the next tab stop) over the selection.
pub fn tab(
    config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    selection: &Selection,
) -> EditOperationResult {
    if !selection.is_empty() && selection.range.spans_multiple_lines() {
        return indent(config, selection);
    }
    let inserted = if config.insert_spaces {
        let start = selection.range.start;
        let visible =
            visible_column_from_column(&buffer.line_content(start.line), start.column, config.tab_size);
        let width = cell_width_at('\t', visible, config.tab_size);
        " ".repeat(width)
    } else {
        "\t".to_string()
    };
    EditOperationResult::new(Box::new(ReplaceCommand::new(selection.range, inserted)))
}

/// Build the per-cursor paste results for the whole selection set.
///
/// When the pasted text splits into exactly one line per cursor (and no
/// selection spans multiple lines), each cursor receives its line, assigned by
/// *selection order* rather than cursor index. `multicursor_text` overrides
/// the split when the upstream clipboard recorded per-cursor segments.
/// Otherwise every cursor receives the full text; with `paste_on_new_line`,
/// an empty-selection cursor pasting whole lines inserts at its line start
/// and keeps its place via a tracked selection.
pub fn paste(
    _config: &CursorConfig,
    _buffer: &dyn CursorBuffer,
    selections: &[Selection],
    text: &str,
    paste_on_new_line: bool,
    multicursor_text: Option<&[String]>,
) -> Vec<EditOperationResult> {
    let distributed = distribute_paste(selections, text, multicursor_text);

    selections
        .iter()
        .enumerate()
        .map(|(index, selection)| {
            let result = if let Some(pieces) = &distributed {
                EditOperationResult::new(Box::new(ReplaceCommand::forcing_markers(
                    selection.range,
                    pieces[index].clone(),
                )))
            } else if paste_on_new_line
                && selection.is_empty()
                && text.ends_with('\n')
            {
                let line = selection.active().line;
                EditOperationResult::new(Box::new(TrackedReplaceCommand {
                    range: Range::collapsed(Position::new(line, 1)),
                    text: text.to_string(),
                    tracked: *selection,
                }))
            } else {
                EditOperationResult::new(Box::new(ReplaceCommand::forcing_markers(
                    selection.range,
                    text,
                )))
            };
            result.sealed(true, true)
        })
        .collect()
}

/// Resolve the per-cursor paste segments, if distribution applies. The
/// returned vector is indexed by cursor index.
fn distribute_paste(
    selections: &[Selection],
    text: &str,
    multicursor_text: Option<&[String]>,
) -> Option<Vec<String>> {
    if selections.len() <= 1 {
        return None;
    }
    if selections.iter().any(|s| s.range.spans_multiple_lines()) {
        return None;
    }

    let pieces: Vec<String> = match multicursor_text {
        Some(segments) => segments.to_vec(),
        None => split_paste_lines(text),
    };
    if pieces.len() != selections.len() {
        return None;
    }

    // Assign pieces in selection order: the cursor whose selection sorts
    // first gets the first line, regardless of its collection index.
    let mut order: Vec<usize> = (0..selections.len()).collect();
    order.sort_by_key(|&i| selections[i].range.start);

    let mut by_cursor = vec![String::new(); selections.len()];
    for (piece_index, cursor_index) in order.into_iter().enumerate() {
        by_cursor[cursor_index] = pieces[piece_index].clone();
    }
    Some(by_cursor)
}

/// Split pasted text on `\r\n`, `\n`, or `\r`, dropping a single trailing
/// empty segment (text that ends with a newline still maps one line per
/// cursor).
fn split_paste_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut pieces: Vec<String> = normalized.split('\n').map(str::to_string).collect();
    if pieces.len() > 1 && pieces.last().is_some_and(String::is_empty) {
        pieces.pop();
    }
    pieces
}
