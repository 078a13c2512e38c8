//! Cursor engine configuration.
//!
//! All knobs the engine reads live here; the owner of the engine decides where
//! the values come from (user settings, per-language overrides, etc.).

/// Configuration consumed by movement and edit-operation builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorConfig {
    /// Tab stop width in visible cells. Must be at least 1.
    pub tab_size: usize,
    /// Whether the Tab key inserts spaces up to the next tab stop instead of a
    /// literal `'\t'`. Also controls the indent unit used by indent/outdent.
    pub insert_spaces: bool,
    /// Number of lines a page movement travels.
    pub page_size: usize,
    /// Whether cut with an empty selection removes the whole line (clipboard
    /// "cut line" semantics are handled upstream; the engine only produces the
    /// matching deletion).
    pub empty_selection_clipboard: bool,
    /// Hard cap on simultaneous cursors. Requests beyond the cap are refused
    /// and a one-time notice event is raised.
    pub max_cursor_count: usize,
}

impl CursorConfig {
    /// The text inserted for one level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size.max(1))
        } else {
            "\t".to_string()
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: false,
            page_size: 40,
            empty_selection_clipboard: true,
            max_cursor_count: 10_000,
        }
    }
}
