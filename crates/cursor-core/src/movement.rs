//! Pure cursor movement operations.
//!
//! Every function here computes a new caret or selection from the current one
//! plus buffer content queries; nothing in this module mutates anything.
//!
//! # Visible columns
//!
//! Vertical movement works in *visible* columns (0-based cells): tabs expand
//! to the next tab stop and wide characters (UAX #11) count as their cell
//! width, so moving through lines of differing indentation keeps the caret
//! visually aligned. When the destination line is too short to reach the
//! target visible column, the missing cells are remembered as the *leftover
//! visible column* and re-applied by the next consecutive vertical move.
//!
//! # Surrogate pairs
//!
//! Columns are UTF-16 code units; horizontal movement steps one Unicode code
//! point at a time, so an astral character moves the column by 2 and no
//! movement ever lands between its two code units.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::buffer::CursorBuffer;
use crate::config::CursorConfig;
use crate::cursor::SelectionState;
use crate::position::Position;
use crate::selection::Selection;
use crate::text;

/// A movement kind, dispatched by the controller per cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// One code point left; wraps to the previous line end.
    Left,
    /// One code point right; wraps to the next line start.
    Right,
    /// `count` lines up, preserving the visible column.
    Up {
        /// Number of lines to travel.
        count: usize,
    },
    /// `count` lines down, preserving the visible column.
    Down {
        /// Number of lines to travel.
        count: usize,
    },
    /// Toggle between the first non-whitespace column and column 1.
    Home,
    /// End of line.
    End,
    /// Start of the previous word.
    WordLeft,
    /// End of the next word.
    WordRight,
    /// Line 1, column 1.
    BufferStart,
    /// Last line, last column.
    BufferEnd,
    /// One page up (vertical semantics, `config.page_size` lines).
    PageUp,
    /// One page down.
    PageDown,
}

/// Visual cell width of `ch` at `cell_offset` within its line.
///
/// Tabs advance to the next tab stop; other widths follow UAX #11.
pub fn cell_width_at(ch: char, cell_offset: usize, tab_size: usize) -> usize {
    if ch == '\t' {
        let tab_size = tab_size.max(1);
        tab_size - cell_offset % tab_size
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(1)
    }
}

/// 0-based visible column of the 1-based UTF-16 `column` in `line`.
pub fn visible_column_from_column(line: &str, column: usize, tab_size: usize) -> usize {
    let mut x = 0usize;
    for (col, ch) in text::columns(line) {
        if col >= column {
            break;
        }
        x += cell_width_at(ch, x, tab_size);
    }
    x
}

/// Largest 1-based column of `line` whose visible column does not exceed
/// `visible_column`. Always lands on a code point boundary.
pub fn column_from_visible_column(line: &str, visible_column: usize, tab_size: usize) -> usize {
    let mut x = 0usize;
    let mut result = 1usize;
    for (col, ch) in text::columns(line) {
        if x > visible_column {
            break;
        }
        result = col;
        let width = cell_width_at(ch, x, tab_size);
        if x + width > visible_column {
            return col;
        }
        x += width;
        result = col + ch.len_utf16();
    }
    result
}

/// Outcome of a movement: new caret plus the leftover visible column carried
/// to the next vertical move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// New caret position.
    pub position: Position,
    /// Remaining visible cells the destination line could not provide.
    pub leftover_visible_column: usize,
}

impl MoveOutcome {
    fn flat(position: Position) -> Self {
        Self { position, leftover_visible_column: 0 }
    }
}

/// One code point left from `(line, column)`, wrapping to the previous line.
pub fn left(buffer: &dyn CursorBuffer, line: usize, column: usize) -> Position {
    let content = buffer.line_content(line);
    match text::prev_column(&content, column) {
        Some(col) => Position::new(line, col),
        None if line > 1 => Position::new(line - 1, buffer.line_max_column(line - 1)),
        None => Position::new(line, 1),
    }
}

/// One code point right from `(line, column)`, wrapping to the next line.
pub fn right(buffer: &dyn CursorBuffer, line: usize, column: usize) -> Position {
    let content = buffer.line_content(line);
    match text::next_column(&content, column) {
        Some(col) => Position::new(line, col),
        None if line < buffer.line_count() => Position::new(line + 1, 1),
        None => Position::new(line, column),
    }
}

/// Vertical movement by `delta` lines (negative = up).
///
/// `allow_move_on_edge`: when the move runs off the first or last line, clamp
/// to the true buffer start/end column instead of staying on the edge line.
pub fn vertical(
    config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    position: Position,
    leftover_visible_column: usize,
    delta: isize,
    allow_move_on_edge: bool,
) -> MoveOutcome {
    let content = buffer.line_content(position.line);
    let target_visible =
        visible_column_from_column(&content, position.column, config.tab_size)
            + leftover_visible_column;

    let line_count = buffer.line_count();
    let target_line = position.line as isize + delta;

    if target_line < 1 {
        if allow_move_on_edge {
            return MoveOutcome::flat(Position::new(1, 1));
        }
        let column = column_from_visible_column(&buffer.line_content(1), target_visible, config.tab_size);
        let achieved = visible_column_from_column(&buffer.line_content(1), column, config.tab_size);
        return MoveOutcome {
            position: Position::new(1, column),
            leftover_visible_column: target_visible - achieved,
        };
    }
    if target_line as usize > line_count {
        if allow_move_on_edge {
            return MoveOutcome::flat(Position::new(line_count, buffer.line_max_column(line_count)));
        }
        let content = buffer.line_content(line_count);
        let column = column_from_visible_column(&content, target_visible, config.tab_size);
        let achieved = visible_column_from_column(&content, column, config.tab_size);
        return MoveOutcome {
            position: Position::new(line_count, column),
            leftover_visible_column: target_visible - achieved,
        };
    }

    let target_line = target_line as usize;
    let target_content = buffer.line_content(target_line);
    let column = column_from_visible_column(&target_content, target_visible, config.tab_size);
    let achieved = visible_column_from_column(&target_content, column, config.tab_size);
    MoveOutcome {
        position: Position::new(target_line, column),
        leftover_visible_column: target_visible - achieved,
    }
}

/// Home: first non-whitespace column, or column 1 when already there.
pub fn line_start(buffer: &dyn CursorBuffer, line: usize, column: usize) -> Position {
    let content = buffer.line_content(line);
    let indent = text::first_non_whitespace_column(&content).unwrap_or(1);
    if column == indent {
        Position::new(line, 1)
    } else {
        Position::new(line, indent)
    }
}

/// End of line.
pub fn line_end(buffer: &dyn CursorBuffer, line: usize) -> Position {
    Position::new(line, buffer.line_max_column(line))
}

/// Start of the word before `(line, column)`; previous line end when there is
/// no earlier word on the line.
pub fn word_left(buffer: &dyn CursorBuffer, line: usize, column: usize) -> Position {
    let content = buffer.line_content(line);
    let byte = text::byte_offset_of_column(&content, column);
    let mut best: Option<usize> = None;
    for (start, word) in content.split_word_bound_indices() {
        if start >= byte {
            break;
        }
        if !word.trim().is_empty() {
            best = Some(start);
        }
    }
    match best {
        Some(start) => {
            let char_offset = content[..start].chars().count();
            Position::new(line, text::column_of_char_offset(&content, char_offset))
        }
        None if line > 1 => Position::new(line - 1, buffer.line_max_column(line - 1)),
        None => Position::new(line, 1),
    }
}

/// End of the word after `(line, column)`; next line start when the rest of
/// the line is blank.
pub fn word_right(buffer: &dyn CursorBuffer, line: usize, column: usize) -> Position {
    let content = buffer.line_content(line);
    let byte = text::byte_offset_of_column(&content, column);
    for (start, word) in content.split_word_bound_indices() {
        let end = start + word.len();
        if end > byte && !word.trim().is_empty() {
            let char_offset = content[..end].chars().count();
            return Position::new(line, text::column_of_char_offset(&content, char_offset));
        }
    }
    if line < buffer.line_count() {
        Position::new(line + 1, 1)
    } else {
        Position::new(line, buffer.line_max_column(line))
    }
}

/// Apply `movement` to one cursor's selection state.
///
/// When the cursor has a non-empty selection and the move does not extend it,
/// horizontal moves collapse to the selection's near edge (left: start,
/// right: end) and vertical moves depart from the far edge in the travel
/// direction (up: start, down: end). This reproduces the "arrow key collapses
/// the selection" UX exactly.
pub fn move_selection(
    config: &CursorConfig,
    buffer: &dyn CursorBuffer,
    state: &SelectionState,
    movement: Movement,
    extend: bool,
) -> SelectionState {
    let selection = state.selection;
    let has_selection = !selection.is_empty();
    let caret = selection.active();

    let outcome = match movement {
        Movement::Left => {
            if has_selection && !extend {
                MoveOutcome::flat(selection.range.start)
            } else {
                MoveOutcome::flat(left(buffer, caret.line, caret.column))
            }
        }
        Movement::Right => {
            if has_selection && !extend {
                MoveOutcome::flat(selection.range.end)
            } else {
                MoveOutcome::flat(right(buffer, caret.line, caret.column))
            }
        }
        Movement::Up { count } => {
            let from = if has_selection && !extend { selection.range.start } else { caret };
            vertical(
                config,
                buffer,
                from,
                state.leftover_visible_column,
                -(count as isize),
                true,
            )
        }
        Movement::Down { count } => {
            let from = if has_selection && !extend { selection.range.end } else { caret };
            vertical(
                config,
                buffer,
                from,
                state.leftover_visible_column,
                count as isize,
                true,
            )
        }
        Movement::PageUp => vertical(
            config,
            buffer,
            caret,
            state.leftover_visible_column,
            -(config.page_size as isize),
            false,
        ),
        Movement::PageDown => vertical(
            config,
            buffer,
            caret,
            state.leftover_visible_column,
            config.page_size as isize,
            false,
        ),
        Movement::Home => MoveOutcome::flat(line_start(buffer, caret.line, caret.column)),
        Movement::End => MoveOutcome::flat(line_end(buffer, caret.line)),
        Movement::WordLeft => MoveOutcome::flat(word_left(buffer, caret.line, caret.column)),
        Movement::WordRight => MoveOutcome::flat(word_right(buffer, caret.line, caret.column)),
        Movement::BufferStart => MoveOutcome::flat(Position::new(1, 1)),
        Movement::BufferEnd => {
            let last = buffer.line_count();
            MoveOutcome::flat(Position::new(last, buffer.line_max_column(last)))
        }
    };

    let new_selection = if extend {
        selection.with_active(outcome.position)
    } else {
        Selection::caret(outcome.position)
    };

    SelectionState {
        selection: new_selection,
        leftover_visible_column: outcome.leftover_visible_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_model::TextModel;

    #[test]
    fn test_visible_column_expands_tabs() {
        assert_eq!(visible_column_from_column("\tabc", 1, 4), 0);
        assert_eq!(visible_column_from_column("\tabc", 2, 4), 4);
        assert_eq!(visible_column_from_column("\tabc", 3, 4), 5);
        // Tab after one char advances to the next stop, not by a full width.
        assert_eq!(visible_column_from_column("a\tb", 3, 4), 4);
    }

    #[test]
    fn test_column_from_visible_column_floors_into_tab() {
        assert_eq!(column_from_visible_column("\tabc", 0, 4), 1);
        assert_eq!(column_from_visible_column("\tabc", 2, 4), 1);
        assert_eq!(column_from_visible_column("\tabc", 4, 4), 2);
        assert_eq!(column_from_visible_column("\tabc", 99, 4), 5);
        assert_eq!(column_from_visible_column("", 3, 4), 1);
    }

    #[test]
    fn test_horizontal_wraps_lines() {
        let model = TextModel::new("ab\ncd");
        assert_eq!(left(&model, 2, 1), Position::new(1, 3));
        assert_eq!(right(&model, 1, 3), Position::new(2, 1));
        assert_eq!(left(&model, 1, 1), Position::new(1, 1));
        assert_eq!(right(&model, 2, 3), Position::new(2, 3));
    }

    #[test]
    fn test_horizontal_steps_over_astral_chars() {
        let model = TextModel::new("a😀b");
        assert_eq!(right(&model, 1, 2), Position::new(1, 4));
        assert_eq!(left(&model, 1, 4), Position::new(1, 2));
    }

    #[test]
    fn test_home_toggles_indentation() {
        let model = TextModel::new("  hi");
        assert_eq!(line_start(&model, 1, 5), Position::new(1, 3));
        assert_eq!(line_start(&model, 1, 3), Position::new(1, 1));
        assert_eq!(line_start(&model, 1, 1), Position::new(1, 3));
    }

    #[test]
    fn test_word_movement() {
        let model = TextModel::new("foo bar_baz  qux");
        assert_eq!(word_right(&model, 1, 1), Position::new(1, 4));
        assert_eq!(word_right(&model, 1, 4), Position::new(1, 12));
        assert_eq!(word_left(&model, 1, 12), Position::new(1, 5));
        assert_eq!(word_left(&model, 1, 5), Position::new(1, 1));
    }

    #[test]
    fn test_word_movement_crosses_lines() {
        let model = TextModel::new("foo\nbar");
        assert_eq!(word_right(&model, 1, 4), Position::new(2, 1));
        assert_eq!(word_left(&model, 2, 1), Position::new(1, 4));
    }
}
