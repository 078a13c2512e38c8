//! Internal UTF-16 column arithmetic over UTF-8 line content.
//!
//! Columns are 1-based and counted in UTF-16 code units, so an astral code
//! point (anything outside the BMP) occupies two columns. The helpers here
//! guarantee that derived columns never land between the two halves of such a
//! code point.

/// Length of `line` in UTF-16 code units.
pub(crate) fn utf16_len(line: &str) -> usize {
    line.chars().map(char::len_utf16).sum()
}

/// Iterate `(column, ch)` pairs where `column` is the 1-based UTF-16 column at
/// which `ch` starts.
pub(crate) fn columns(line: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut column = 1usize;
    line.chars().map(move |ch| {
        let start = column;
        column += ch.len_utf16();
        (start, ch)
    })
}

/// The character starting at `column`, if any.
pub(crate) fn char_at_column(line: &str, column: usize) -> Option<char> {
    columns(line).find(|&(c, _)| c == column).map(|(_, ch)| ch)
}

/// Clamp `column` into `1..=utf16_len+1` and snap it to the start of the
/// astral code point it would otherwise split.
pub(crate) fn snap_column(line: &str, column: usize) -> usize {
    let max = utf16_len(line) + 1;
    let column = column.clamp(1, max);
    for (start, ch) in columns(line) {
        let end = start + ch.len_utf16();
        if column > start && column < end {
            return start;
        }
        if start >= column {
            break;
        }
    }
    column
}

/// The column one code point to the left of `column`, or `None` at column 1.
pub(crate) fn prev_column(line: &str, column: usize) -> Option<usize> {
    if column <= 1 {
        return None;
    }
    let mut last_start = 1usize;
    for (start, ch) in columns(line) {
        let end = start + ch.len_utf16();
        if end >= column {
            return Some(start);
        }
        last_start = start;
    }
    Some(last_start)
}

/// The column one code point to the right of `column`, or `None` at
/// end-of-line.
pub(crate) fn next_column(line: &str, column: usize) -> Option<usize> {
    for (start, ch) in columns(line) {
        if start == column {
            return Some(start + ch.len_utf16());
        }
        if start > column {
            break;
        }
    }
    None
}

/// Byte offset of the 1-based UTF-16 `column` in `line`. The column is
/// expected to be snapped (never inside an astral pair).
pub(crate) fn byte_offset_of_column(line: &str, column: usize) -> usize {
    let mut col = 1usize;
    for (byte_idx, ch) in line.char_indices() {
        if col >= column {
            return byte_idx;
        }
        col += ch.len_utf16();
    }
    line.len()
}

/// Offset of the 1-based UTF-16 `column` in `char`s from the line start.
pub(crate) fn char_offset_of_column(line: &str, column: usize) -> usize {
    let mut col = 1usize;
    for (char_idx, ch) in line.chars().enumerate() {
        if col >= column {
            return char_idx;
        }
        col += ch.len_utf16();
    }
    line.chars().count()
}

/// 1-based UTF-16 column of the `char_offset`-th character of `line`.
pub(crate) fn column_of_char_offset(line: &str, char_offset: usize) -> usize {
    let mut col = 1usize;
    for ch in line.chars().take(char_offset) {
        col += ch.len_utf16();
    }
    col
}

/// First column holding a non-whitespace character, or `None` for an
/// all-whitespace (or empty) line.
pub(crate) fn first_non_whitespace_column(line: &str) -> Option<usize> {
    columns(line)
        .find(|&(_, ch)| ch != ' ' && ch != '\t')
        .map(|(col, _)| col)
}

/// Leading whitespace prefix of `line` (spaces and tabs only).
pub(crate) fn leading_whitespace(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut end = 0usize;
    while end < bytes.len() {
        match bytes[end] {
            b' ' | b'\t' => end += 1,
            _ => break,
        }
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_len_counts_surrogate_pairs() {
        assert_eq!(utf16_len("abc"), 3);
        // U+1F600 is outside the BMP: two UTF-16 code units.
        assert_eq!(utf16_len("a😀b"), 4);
    }

    #[test]
    fn test_snap_column_never_splits_astral_char() {
        let line = "a😀b";
        // Columns: 'a' at 1, '😀' at 2..4, 'b' at 4.
        assert_eq!(snap_column(line, 3), 2);
        assert_eq!(snap_column(line, 2), 2);
        assert_eq!(snap_column(line, 4), 4);
        assert_eq!(snap_column(line, 99), 5);
        assert_eq!(snap_column(line, 0), 1);
    }

    #[test]
    fn test_prev_next_column_step_code_points() {
        let line = "a😀b";
        assert_eq!(next_column(line, 1), Some(2));
        assert_eq!(next_column(line, 2), Some(4));
        assert_eq!(next_column(line, 4), Some(5));
        assert_eq!(next_column(line, 5), None);
        assert_eq!(prev_column(line, 5), Some(4));
        assert_eq!(prev_column(line, 4), Some(2));
        assert_eq!(prev_column(line, 2), Some(1));
        assert_eq!(prev_column(line, 1), None);
    }

    #[test]
    fn test_byte_and_char_offsets() {
        let line = "a😀b";
        assert_eq!(byte_offset_of_column(line, 1), 0);
        assert_eq!(byte_offset_of_column(line, 2), 1);
        assert_eq!(byte_offset_of_column(line, 4), 5);
        assert_eq!(byte_offset_of_column(line, 5), 6);
        assert_eq!(char_offset_of_column(line, 4), 2);
        assert_eq!(column_of_char_offset(line, 2), 4);
    }

    #[test]
    fn test_first_non_whitespace_column() {
        assert_eq!(first_non_whitespace_column("\t  x"), Some(4));
        assert_eq!(first_non_whitespace_column("   "), None);
        assert_eq!(first_non_whitespace_column(""), None);
        assert_eq!(leading_whitespace("\t x y"), "\t ");
    }
}
