//! Position and range primitives.
//!
//! A [`Position`] addresses a point in a buffer as a 1-based line number plus a
//! 1-based column counted in UTF-16 code units. `column == line_length + 1`
//! denotes the end of the line. A [`Range`] is an ordered pair of positions
//! (`start <= end` always holds).
//!
//! Both types are small immutable values; all "mutations" return new values.

use std::cmp::Ordering;

/// A point in the buffer: 1-based line number, 1-based UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column in UTF-16 code units. `line_length + 1` is end-of-line.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Strictly before `other` in (line, column) order.
    pub fn is_before(&self, other: Position) -> bool {
        *self < other
    }

    /// Before or equal to `other` in (line, column) order.
    pub fn is_before_or_equal(&self, other: Position) -> bool {
        *self <= other
    }

    /// Shift this position by a number of lines, keeping the column.
    pub fn with_line(&self, line: usize) -> Self {
        Self { line, column: self.column }
    }

    /// Same line, different column.
    pub fn with_column(&self, column: usize) -> Self {
        Self { line: self.line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An ordered pair of positions with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Inclusive start position.
    pub start: Position,
    /// Exclusive end position (equal to `start` for an empty range).
    pub end: Position,
}

impl Range {
    /// Create a range from two positions, swapping them if needed so that
    /// `start <= end`.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A collapsed range at a single position.
    pub fn collapsed(position: Position) -> Self {
        Self { start: position, end: position }
    }

    /// `true` if `start == end`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `true` if `position` lies inside this range (endpoints included).
    pub fn contains_position(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// `true` if `other` lies fully inside this range (endpoints included).
    pub fn contains_range(&self, other: Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// `true` if the two ranges share at least one position. Touching ranges
    /// (one's end equals the other's start) count as intersecting.
    pub fn intersects_or_touches(&self, other: Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// `true` if the two ranges share an interior point. Touching ranges do
    /// not count.
    pub fn strictly_intersects(&self, other: Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The smallest range covering both `self` and `other`.
    pub fn union(&self, other: Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Collapse to the start position.
    pub fn collapse_to_start(&self) -> Range {
        Range::collapsed(self.start)
    }

    /// Collapse to the end position.
    pub fn collapse_to_end(&self) -> Range {
        Range::collapsed(self.end)
    }

    /// `true` if the range spans more than one line.
    pub fn spans_multiple_lines(&self) -> bool {
        self.start.line != self.end.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 5) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 4));
        assert!(Position::new(2, 2).is_before_or_equal(Position::new(2, 2)));
        assert!(!Position::new(2, 3).is_before(Position::new(2, 3)));
    }

    #[test]
    fn test_range_normalizes_endpoints() {
        let r = Range::new(Position::new(3, 1), Position::new(1, 4));
        assert_eq!(r.start, Position::new(1, 4));
        assert_eq!(r.end, Position::new(3, 1));
    }

    #[test]
    fn test_range_intersection() {
        let a = Range::new(Position::new(1, 1), Position::new(1, 5));
        let b = Range::new(Position::new(1, 5), Position::new(1, 9));
        let c = Range::new(Position::new(1, 6), Position::new(1, 9));
        assert!(a.intersects_or_touches(b));
        assert!(!a.strictly_intersects(b));
        assert!(!a.intersects_or_touches(c));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Range::new(Position::new(1, 1), Position::new(1, 5));
        let b = Range::new(Position::new(1, 3), Position::new(2, 2));
        let u = a.union(b);
        assert_eq!(u.start, Position::new(1, 1));
        assert_eq!(u.end, Position::new(2, 2));
    }
}
