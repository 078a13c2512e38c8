//! Error type for the cursor engine.
//!
//! Only caller contract violations surface as errors. Internal abort
//! conditions (a primary cursor losing an edit conflict, an edit escaping the
//! editable range) drop the triggering intent, log a warning, and leave buffer
//! and cursor state untouched; they are not reported through this type.

use thiserror::Error;

/// Errors surfaced by the public cursor API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// A position payload referenced a line or column outside sane bounds
    /// (zero, or otherwise not interpretable).
    #[error("malformed position: line {line}, column {column}")]
    MalformedPosition {
        /// Offending line value.
        line: usize,
        /// Offending column value.
        column: usize,
    },
    /// `set_selections` was called with an empty selection list; at least one
    /// cursor must always exist.
    #[error("at least one selection is required")]
    EmptySelections,
    /// A pluggable edit command failed while computing its edits. The failing
    /// cursor's contribution is dropped; other cursors proceed.
    #[error("command execution failed: {0}")]
    CommandFailed(String),
    /// An intent was dispatched from within an intent handler.
    #[error("re-entrant intent dispatch")]
    ReentrantDispatch,
}
