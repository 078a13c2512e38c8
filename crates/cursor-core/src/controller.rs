//! The cursor controller: intent dispatch and the command execution pipeline.
//!
//! One [`CursorController`] sits between the UI/API layer and a
//! [`CursorBuffer`]. Callers hand it intents via [`trigger`](CursorController::trigger);
//! the controller fans each intent out across the cursor collection, arbitrates
//! conflicting edits, applies the surviving edits as one atomic buffer
//! transaction, recomputes every cursor from the transaction's reverse edits
//! or tracked markers, and notifies subscribers of what changed.
//!
//! # Pipeline
//!
//! Every intent runs the same synchronous cycle:
//!
//! 1. snapshot the current selections for change detection,
//! 2. re-validate all cursors against the buffer,
//! 3. run the intent handler (pure movement mutates the collection directly;
//!    edits collect one [`EditOperationResult`] per cursor),
//! 4. arbitrate overlapping edits (lower cursor index wins; a losing primary
//!    aborts the whole intent),
//! 5. refuse edits escaping a restricted editable range,
//! 6. apply the survivors atomically and recompute cursor selections,
//! 7. drop losing cursors and install the new selection set,
//! 8. emit position/selection change events and a reveal request,
//! 9. normalize the collection (merge identical/overlapping/touching cursors).
//!
//! There is no parallelism here; cursors within one intent "race" only
//! logically, and step 4 resolves that race deterministically.

use crate::buffer::{CursorBuffer, EditOperation, MarkerId, ReverseEdit};
use crate::collection::CursorCollection;
use crate::commands::{Command, EditBatch, TrackedSelectionRequest, TransactionOutcome};
use crate::config::CursorConfig;
use crate::cursor::{CursorState, SelectionState};
use crate::error::CursorError;
use crate::events::{
    CursorChangeReason, CursorEvent, CursorEventCallback, PositionChangedEvent, RevealRequest,
    RevealTarget, SelectionChangedEvent,
};
use crate::movement::{self, Movement};
use crate::operations::{self, EditOperationResult};
use crate::position::{Position, Range};
use crate::selection::Selection;

/// An editing or movement intent accepted by [`CursorController::trigger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorIntent {
    /// Collapse to a single cursor at `position` (mouse click), or extend the
    /// primary selection to it.
    MoveTo {
        /// Target position.
        position: Position,
        /// Extend the primary selection instead of collapsing.
        extend: bool,
    },
    /// Apply a movement to every cursor.
    Move {
        /// The movement to apply.
        movement: Movement,
        /// Extend each selection instead of moving the caret.
        extend: bool,
    },
    /// Add a secondary cursor at `position` (modifier-click).
    CreateCursor {
        /// Caret position of the new cursor.
        position: Position,
    },
    /// Add one cursor above every existing cursor, keeping visible columns.
    AddCursorAbove,
    /// Add one cursor below every existing cursor, keeping visible columns.
    AddCursorBelow,
    /// Collapse back to the primary cursor.
    KillSecondaryCursors,
    /// Select the entire buffer with a single cursor.
    SelectAll,
    /// Replace the cursor set with one selection per line of a rectangular
    /// region, from the anchor's line to `to_line` at `to_visible_column`.
    ColumnSelect {
        /// Fixed corner of the rectangle.
        anchor: Position,
        /// Line of the moving corner.
        to_line: usize,
        /// Visible column (0-based cells) of the moving corner.
        to_visible_column: usize,
    },
    /// Replace the cursor set with explicit selections.
    SetSelections {
        /// New selections; index 0 becomes primary. Must be non-empty.
        selections: Vec<Selection>,
    },
    /// Type text at every cursor, one character per pipeline cycle.
    Type {
        /// The typed text.
        text: String,
    },
    /// Replace text around every caret with an IME composition update.
    Compose {
        /// The composed text.
        text: String,
        /// Code points before the caret to replace.
        replace_prev: usize,
        /// Code points after the caret to replace.
        replace_next: usize,
    },
    /// Insert a line break at every cursor.
    InsertLineBreak,
    /// Paste at every cursor, distributing lines across cursors when the
    /// line count matches.
    Paste {
        /// Pasted text.
        text: String,
        /// Whole-line paste inserts at line start when the selection is empty.
        paste_on_new_line: bool,
        /// Per-cursor segments recorded by an earlier multi-cursor copy.
        multicursor_text: Option<Vec<String>>,
    },
    /// Delete one code point (or the selection) to the left of every cursor.
    DeleteLeft,
    /// Delete one code point (or the selection) to the right of every cursor.
    DeleteRight,
    /// Delete the selection, or the whole line when it is empty.
    Cut,
    /// Tab key: indent multi-line selections, insert a tab stop otherwise.
    Tab,
    /// Indent every line covered by each selection.
    Indent,
    /// Outdent every line covered by each selection.
    Outdent,
    /// Undo the last undo group and adopt its recorded selections.
    Undo,
    /// Redo the last undone group and adopt its recorded selections.
    Redo,
}

/// Classifies edits for undo coalescing: consecutive intents of the same kind
/// share an undo group, a kind change seals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Typing,
    DeletingLeft,
    DeletingRight,
    Other,
}

/// Multi-cursor engine facade over a [`CursorBuffer`].
pub struct CursorController {
    config: CursorConfig,
    collection: CursorCollection,
    listeners: Vec<CursorEventCallback>,
    is_handling: bool,
    last_known_version: u64,
    prev_edit_kind: EditKind,
    cursor_limit_notified: bool,
}

impl CursorController {
    /// Create a controller with a single cursor at the buffer start.
    pub fn new(buffer: &dyn CursorBuffer, config: CursorConfig) -> Self {
        Self {
            config,
            collection: CursorCollection::new(buffer),
            listeners: Vec::new(),
            is_handling: false,
            last_known_version: buffer.version(),
            prev_edit_kind: EditKind::Other,
            cursor_limit_notified: false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next intent.
    pub fn set_config(&mut self, config: CursorConfig) {
        self.config = config;
    }

    /// The cursor collection (read-only).
    pub fn collection(&self) -> &CursorCollection {
        &self.collection
    }

    /// Model-space selections of every cursor, primary first.
    pub fn selections(&self) -> Vec<Selection> {
        self.collection.selections()
    }

    /// The primary caret position.
    pub fn position(&self) -> Position {
        self.collection.primary().position()
    }

    /// Number of cursors.
    pub fn cursor_count(&self) -> usize {
        self.collection.count()
    }

    /// Register an event listener. Listeners are invoked synchronously, in
    /// registration order, after each handled intent.
    pub fn subscribe(&mut self, callback: CursorEventCallback) {
        self.listeners.push(callback);
    }

    /// Dispatch one intent through the pipeline.
    ///
    /// `source` is an arbitrary caller tag ("keyboard", "mouse", "api", ...)
    /// echoed back in change events so listeners can attribute changes.
    pub fn trigger(
        &mut self,
        buffer: &mut dyn CursorBuffer,
        source: &str,
        intent: CursorIntent,
    ) -> Result<(), CursorError> {
        if self.is_handling {
            return Err(CursorError::ReentrantDispatch);
        }
        self.is_handling = true;
        let result = self.dispatch(buffer, source, intent);
        self.is_handling = false;
        result
    }

    /// Notify the controller that the buffer changed outside the pipeline.
    ///
    /// Content changes produced by this controller's own transactions are
    /// recognized by version and ignored. An external *flush* (wholesale
    /// content replacement) rebuilds the collection down to a single cursor
    /// near the old primary; an incremental external edit re-validates every
    /// cursor in place. Notifications arriving mid-intent are ignored; the
    /// pipeline re-validates at the start of the next intent anyway.
    pub fn on_content_changed(&mut self, buffer: &dyn CursorBuffer, source: &str, is_flush: bool) {
        if self.is_handling || buffer.version() == self.last_known_version {
            return;
        }
        self.last_known_version = buffer.version();
        self.prev_edit_kind = EditKind::Other;

        let old_model = self.collection.selections();
        let old_view = self.collection.view_selections();

        if is_flush {
            let primary = buffer.validate_position(self.collection.primary().position());
            self.collection = CursorCollection::new(buffer);
            self.collection
                .set_selections(buffer, &[Selection::caret(primary)]);
            self.emit_state_change(
                source,
                CursorChangeReason::ContentFlush,
                &old_model,
                &old_view,
                None,
                true,
            );
        } else {
            self.collection.ensure_valid(buffer);
            self.emit_state_change(
                source,
                CursorChangeReason::RecoverFromMarkers,
                &old_model,
                &old_view,
                None,
                true,
            );
        }
        self.collection.normalize();
    }

    fn dispatch(
        &mut self,
        buffer: &mut dyn CursorBuffer,
        source: &str,
        intent: CursorIntent,
    ) -> Result<(), CursorError> {
        let old_model = self.collection.selections();
        let old_view = self.collection.view_selections();

        self.collection.ensure_valid(buffer);

        let mut reason = CursorChangeReason::Explicit;
        let mut reveal = Some(RevealTarget::Primary);
        let mut reveal_horizontal = true;

        match intent {
            CursorIntent::MoveTo { position, extend } => {
                check_position(position)?;
                let position = buffer.validate_position(position);
                let selection = if extend {
                    self.collection.primary().selection().with_active(position)
                } else {
                    Selection::caret(position)
                };
                let state = CursorState::from_model_selection(buffer, selection);
                self.collection.set_states(vec![Some(state)], false);
            }

            CursorIntent::Move { movement, extend } => {
                let states: Vec<Option<CursorState>> = self
                    .collection
                    .all()
                    .iter()
                    .map(|cursor| {
                        let model = movement::move_selection(
                            &self.config,
                            &*buffer,
                            &cursor.model,
                            movement,
                            extend,
                        );
                        Some(CursorState::with_model(model))
                    })
                    .collect();
                self.collection.set_states(states, false);
            }

            CursorIntent::CreateCursor { position } => {
                check_position(position)?;
                reveal = None;
                if !self.cursor_limit_reached(1) {
                    let position = buffer.validate_position(position);
                    self.collection
                        .add_secondary(&*buffer, Selection::caret(position));
                }
            }

            CursorIntent::AddCursorAbove => {
                self.add_cursor_line(buffer, -1);
                reveal = Some(RevealTarget::TopMost);
            }

            CursorIntent::AddCursorBelow => {
                self.add_cursor_line(buffer, 1);
                reveal = Some(RevealTarget::BottomMost);
            }

            CursorIntent::KillSecondaryCursors => {
                self.collection.kill_secondaries();
            }

            CursorIntent::SelectAll => {
                let last = buffer.line_count();
                let selection = Selection::from_anchor_active(
                    Position::new(1, 1),
                    Position::new(last, buffer.line_max_column(last)),
                );
                let state = CursorState::from_model_selection(buffer, selection);
                self.collection.set_states(vec![Some(state)], false);
                reveal = None;
            }

            CursorIntent::ColumnSelect { anchor, to_line, to_visible_column } => {
                check_position(anchor)?;
                reveal = Some(self.column_select(buffer, anchor, to_line, to_visible_column));
            }

            CursorIntent::SetSelections { selections } => {
                if selections.is_empty() {
                    return Err(CursorError::EmptySelections);
                }
                for selection in &selections {
                    check_position(selection.anchor())?;
                    check_position(selection.active())?;
                }
                self.collection.set_selections(&*buffer, &selections);
            }

            CursorIntent::Type { text } => {
                reason = CursorChangeReason::NotSet;
                // One character per cycle, so per-character interceptors
                // layered above this engine observe single keystrokes.
                let mut scratch = [0u8; 4];
                for ch in text.chars() {
                    let piece: &str = ch.encode_utf8(&mut scratch);
                    let results: Vec<EditOperationResult> = self
                        .collection
                        .selections()
                        .iter()
                        .map(|s| operations::type_text(&self.config, &*buffer, s, piece))
                        .collect();
                    reveal_horizontal = self.execute(buffer, results, EditKind::Typing);
                    self.collection.normalize();
                }
            }

            CursorIntent::Compose { text, replace_prev, replace_next } => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| {
                        operations::compose(
                            &self.config,
                            &*buffer,
                            s,
                            &text,
                            replace_prev,
                            replace_next,
                        )
                    })
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Typing);
            }

            CursorIntent::InsertLineBreak => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::insert_line_break(&self.config, &*buffer, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::Paste { text, paste_on_new_line, multicursor_text } => {
                reason = CursorChangeReason::Paste;
                let selections = self.collection.selections();
                let results = operations::paste(
                    &self.config,
                    &*buffer,
                    &selections,
                    &text,
                    paste_on_new_line,
                    multicursor_text.as_deref(),
                );
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::DeleteLeft => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::delete_left(&self.config, &*buffer, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::DeletingLeft);
            }

            CursorIntent::DeleteRight => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::delete_right(&self.config, &*buffer, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::DeletingRight);
            }

            CursorIntent::Cut => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::cut(&self.config, &*buffer, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::Tab => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::tab(&self.config, &*buffer, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::Indent => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::indent(&self.config, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::Outdent => {
                reason = CursorChangeReason::NotSet;
                let results: Vec<EditOperationResult> = self
                    .collection
                    .selections()
                    .iter()
                    .map(|s| operations::outdent(&self.config, s))
                    .collect();
                reveal_horizontal = self.execute(buffer, results, EditKind::Other);
            }

            CursorIntent::Undo => {
                reason = CursorChangeReason::Undo;
                self.prev_edit_kind = EditKind::Other;
                if let Some(selections) = buffer.undo() {
                    self.adopt_selections(&*buffer, &selections);
                }
            }

            CursorIntent::Redo => {
                reason = CursorChangeReason::Redo;
                self.prev_edit_kind = EditKind::Other;
                if let Some(selections) = buffer.redo() {
                    self.adopt_selections(&*buffer, &selections);
                }
            }
        }

        self.last_known_version = buffer.version();
        self.emit_state_change(source, reason, &old_model, &old_view, reveal, reveal_horizontal);
        self.collection.normalize();
        Ok(())
    }

    /// Replace the collection with selections recorded by the buffer
    /// (undo/redo adopts them verbatim, leftover columns reset).
    fn adopt_selections(&mut self, buffer: &dyn CursorBuffer, selections: &[Selection]) {
        let states: Vec<Option<CursorState>> = selections
            .iter()
            .map(|s| Some(CursorState::from_model_selection(buffer, *s)))
            .collect();
        self.collection.set_states(states, false);
    }

    /// Add one caret above (`delta = -1`) or below (`+1`) every cursor,
    /// keeping each cursor's visible column.
    fn add_cursor_line(&mut self, buffer: &dyn CursorBuffer, delta: isize) {
        let mut states: Vec<Option<CursorState>> =
            self.collection.all().iter().copied().map(Some).collect();
        let existing = self.collection.count();
        for index in 0..existing {
            if self.collection.count() + (states.len() - existing) >= self.config.max_cursor_count
            {
                self.notify_cursor_limit();
                break;
            }
            let cursor = self.collection.all()[index];
            let outcome = movement::vertical(
                &self.config,
                buffer,
                cursor.position(),
                cursor.model.leftover_visible_column,
                delta,
                false,
            );
            let mut state = SelectionState::caret(outcome.position);
            state.leftover_visible_column = outcome.leftover_visible_column;
            states.push(Some(CursorState::with_model(state)));
        }
        let added = states.len() > existing;
        self.collection.set_states(states, false);
        if added {
            self.collection.set_last_added(self.collection.count() - 1);
        }
    }

    /// Build one selection per line of a rectangular region.
    fn column_select(
        &mut self,
        buffer: &dyn CursorBuffer,
        anchor: Position,
        to_line: usize,
        to_visible_column: usize,
    ) -> RevealTarget {
        let anchor = buffer.validate_position(anchor);
        let to_line = to_line.clamp(1, buffer.line_count());
        let anchor_visible = movement::visible_column_from_column(
            &buffer.line_content(anchor.line),
            anchor.column,
            self.config.tab_size,
        );
        let down = to_line >= anchor.line;
        let lines: Vec<usize> = if down {
            (anchor.line..=to_line).collect()
        } else {
            (to_line..=anchor.line).rev().collect()
        };

        let mut selections = Vec::with_capacity(lines.len());
        for line in lines {
            if selections.len() >= self.config.max_cursor_count {
                self.notify_cursor_limit();
                break;
            }
            let content = buffer.line_content(line);
            let from_column =
                movement::column_from_visible_column(&content, anchor_visible, self.config.tab_size);
            let to_column =
                movement::column_from_visible_column(&content, to_visible_column, self.config.tab_size);
            selections.push(Selection::from_anchor_active(
                Position::new(line, from_column),
                Position::new(line, to_column),
            ));
        }
        self.collection.set_selections(buffer, &selections);
        self.collection.set_last_added(self.collection.count() - 1);

        if down { RevealTarget::BottomMost } else { RevealTarget::TopMost }
    }

    /// The edit half of the pipeline: conflict resolution, editable-range
    /// enforcement, the atomic buffer transaction, and cursor recomputation.
    /// Returns whether the post-edit reveal should scroll horizontally.
    fn execute(
        &mut self,
        buffer: &mut dyn CursorBuffer,
        results: Vec<EditOperationResult>,
        kind: EditKind,
    ) -> bool {
        let cursor_count = results.len();
        let push_before = kind != self.prev_edit_kind
            || results.iter().any(|r| r.should_push_stack_element_before);
        let push_after = results.iter().any(|r| r.should_push_stack_element_after);
        let reveal_horizontal = results.iter().all(|r| r.should_reveal_horizontal);
        self.prev_edit_kind = kind;

        // Collect every cursor's edits, tagged (major = cursor index,
        // minor = per-cursor sequence).
        let mut commands: Vec<Option<Box<dyn Command>>> = Vec::with_capacity(cursor_count);
        let mut tracked_requests: Vec<Vec<TrackedSelectionRequest>> =
            vec![Vec::new(); cursor_count];
        let mut all_edits: Vec<EditOperation> = Vec::new();
        for (major, result) in results.into_iter().enumerate() {
            let Some(command) = result.command else {
                commands.push(None);
                continue;
            };
            let mut batch = EditBatch::new(major);
            match command.edits(&*buffer, &mut batch) {
                Ok(()) => {
                    let (edits, tracked) = batch.into_parts();
                    all_edits.extend(edits);
                    tracked_requests[major] = tracked;
                    commands.push(Some(command));
                }
                Err(err) => {
                    log::warn!("cursor {major}: dropping failed command: {err}");
                    commands.push(None);
                }
            }
        }
        if all_edits.is_empty() {
            return reveal_horizontal;
        }

        let losers = match resolve_conflicts(&mut all_edits) {
            Ok(losers) => losers,
            Err(()) => {
                log::warn!("primary cursor lost an edit conflict; intent aborted");
                return reveal_horizontal;
            }
        };

        if let Some(editable) = buffer.editable_range() {
            if all_edits.iter().any(|e| !editable.contains_range(e.range)) {
                log::warn!("edit escapes the editable range; intent aborted");
                return reveal_horizontal;
            }
        }

        if push_before {
            buffer.push_stack_element();
        }

        // Sticky markers carrying tracked selections across the transaction.
        // Created only once all abort conditions are behind us, released
        // unconditionally right after the transaction.
        let mut markers: Vec<Vec<(MarkerId, MarkerId)>> = vec![Vec::new(); cursor_count];
        for (major, requests) in tracked_requests.iter().enumerate() {
            if losers.contains(&major) {
                continue;
            }
            for request in requests {
                let anchor = buffer.add_marker(request.selection.anchor(), request.stickiness);
                let active = buffer.add_marker(request.selection.active(), request.stickiness);
                markers[major].push((anchor, active));
            }
        }

        let before = self.collection.selections();
        let after = {
            let commands = &commands;
            let markers = &markers;
            let tracked_requests = &tracked_requests;
            let losers = &losers;
            let pre_selections = &before;
            let mut compute = |b: &dyn CursorBuffer, reverse: &[ReverseEdit]| {
                compute_cursor_states(
                    b,
                    reverse,
                    cursor_count,
                    commands,
                    markers,
                    tracked_requests,
                    losers,
                    pre_selections,
                )
            };
            buffer.push_edit_operations(&before, all_edits, &mut compute)
        };

        for per_cursor in &markers {
            for (anchor, active) in per_cursor {
                buffer.remove_marker(*anchor);
                buffer.remove_marker(*active);
            }
        }

        if push_after {
            buffer.push_stack_element();
        }

        let states: Vec<Option<CursorState>> = after
            .iter()
            .map(|s| Some(CursorState::from_model_selection(&*buffer, *s)))
            .collect();
        self.collection.set_states(states, false);

        reveal_horizontal
    }

    fn cursor_limit_reached(&mut self, additional: usize) -> bool {
        if self.collection.count() + additional <= self.config.max_cursor_count {
            return false;
        }
        self.notify_cursor_limit();
        true
    }

    fn notify_cursor_limit(&mut self) {
        if self.cursor_limit_notified {
            return;
        }
        self.cursor_limit_notified = true;
        let limit = self.config.max_cursor_count;
        self.emit(&CursorEvent::CursorCountLimited { limit });
    }

    fn emit(&mut self, event: &CursorEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Diff against the pre-intent snapshot; emit position-changed then
    /// selection-changed when anything differs, then the reveal request.
    fn emit_state_change(
        &mut self,
        source: &str,
        reason: CursorChangeReason,
        old_model: &[Selection],
        old_view: &[Selection],
        reveal: Option<RevealTarget>,
        reveal_horizontal: bool,
    ) {
        let new_model = self.collection.selections();
        let new_view = self.collection.view_selections();
        if new_model == old_model && new_view == old_view {
            return;
        }

        let positions_changed = old_model.len() != new_model.len()
            || old_model
                .iter()
                .zip(&new_model)
                .any(|(old, new)| old.active() != new.active());
        if positions_changed {
            let event = CursorEvent::PositionChanged(PositionChangedEvent {
                position: new_model[0].active(),
                secondary_positions: new_model[1..].iter().map(|s| s.active()).collect(),
                reason,
                source: source.to_string(),
            });
            self.emit(&event);
        }

        let event = CursorEvent::SelectionChanged(SelectionChangedEvent {
            selection: new_model[0],
            secondary_selections: new_model[1..].to_vec(),
            reason,
            source: source.to_string(),
        });
        self.emit(&event);

        if let Some(target) = reveal {
            if let Some(range) = self.resolve_reveal(target) {
                self.emit(&CursorEvent::RevealRequested(RevealRequest {
                    range,
                    target,
                    reveal_horizontal,
                }));
            }
        }
    }

    /// Resolve a reveal target to a concrete range. The primary target is
    /// suppressed with multiple cursors (ambiguous scroll destination);
    /// topmost/bottommost break position ties by collection order.
    fn resolve_reveal(&self, target: RevealTarget) -> Option<Range> {
        let cursors = self.collection.all();
        let position = match target {
            RevealTarget::Primary => {
                if cursors.len() > 1 {
                    return None;
                }
                cursors[0].position()
            }
            RevealTarget::TopMost => cursors
                .iter()
                .min_by_key(|c| c.position())
                .map(|c| c.position())?,
            RevealTarget::BottomMost => {
                let mut best = cursors[0].position();
                for cursor in &cursors[1..] {
                    if cursor.position() > best {
                        best = cursor.position();
                    }
                }
                best
            }
        };
        Some(Range::collapsed(position))
    }
}

fn check_position(position: Position) -> Result<(), CursorError> {
    if position.line == 0 || position.column == 0 {
        return Err(CursorError::MalformedPosition {
            line: position.line,
            column: position.column,
        });
    }
    Ok(())
}

/// Arbitrate overlapping edits.
///
/// Edits are sorted by range end descending; whenever one edit starts
/// strictly before the previous one ends, the edit whose cursor index is
/// numerically larger loses and all of that cursor's edits are removed.
/// Returns the losing cursor indices, or `Err` when the primary cursor would
/// lose (the caller must abort the intent).
fn resolve_conflicts(edits: &mut Vec<EditOperation>) -> Result<Vec<usize>, ()> {
    let mut losers: Vec<usize> = Vec::new();
    loop {
        edits.sort_by(|a, b| {
            b.range
                .end
                .cmp(&a.range.end)
                .then(b.range.start.cmp(&a.range.start))
        });

        let mut conflicting: Option<usize> = None;
        for pair in edits.windows(2) {
            if pair[0].range.start < pair[1].range.end {
                let a = pair[0].identifier.map_or(0, |id| id.major);
                let b = pair[1].identifier.map_or(0, |id| id.major);
                conflicting = Some(a.max(b));
                break;
            }
        }
        match conflicting {
            None => return Ok(losers),
            Some(0) => return Err(()),
            Some(loser) => {
                edits.retain(|e| e.identifier.map(|id| id.major) != Some(loser));
                losers.push(loser);
            }
        }
    }
}

/// Recompute every surviving cursor's selection after the transaction:
/// a cursor with a command asks it, given its reverse edits (sorted by minor)
/// and resolved tracked selections; a cursor without one keeps its validated
/// pre-edit selection. Losing cursors are dropped here, so the selections the
/// buffer records as the transaction's "after" state are the final ones.
#[allow(clippy::too_many_arguments)]
fn compute_cursor_states(
    buffer: &dyn CursorBuffer,
    reverse: &[ReverseEdit],
    cursor_count: usize,
    commands: &[Option<Box<dyn Command>>],
    markers: &[Vec<(MarkerId, MarkerId)>],
    tracked_requests: &[Vec<TrackedSelectionRequest>],
    losers: &[usize],
    pre_selections: &[Selection],
) -> Vec<Selection> {
    let mut per_major: Vec<Vec<ReverseEdit>> = vec![Vec::new(); cursor_count];
    for edit in reverse {
        if let Some(id) = edit.identifier {
            if id.major < cursor_count {
                per_major[id.major].push(edit.clone());
            }
        }
    }
    for group in &mut per_major {
        group.sort_by_key(|r| r.identifier.map_or(0, |id| id.minor));
    }

    let mut selections = Vec::with_capacity(cursor_count - losers.len());
    for major in 0..cursor_count {
        if losers.contains(&major) {
            continue;
        }
        let selection = match &commands[major] {
            Some(command) => {
                let tracked: Vec<Selection> = markers[major]
                    .iter()
                    .zip(&tracked_requests[major])
                    .map(|((anchor_id, active_id), request)| {
                        let anchor = buffer
                            .marker_position(*anchor_id)
                            .unwrap_or_else(|| buffer.validate_position(request.selection.anchor()));
                        let active = buffer
                            .marker_position(*active_id)
                            .unwrap_or_else(|| buffer.validate_position(request.selection.active()));
                        Selection::from_anchor_active(anchor, active)
                    })
                    .collect();
                let outcome = TransactionOutcome {
                    reverse_edits: &per_major[major],
                    tracked_selections: &tracked,
                };
                command.result_selection(buffer, &outcome)
            }
            None => buffer.validate_selection(pre_selections[major]),
        };
        selections.push(selection);
    }
    selections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::EditIdentifier;
    use crate::text_model::TextModel;

    fn edit(major: usize, minor: usize, range: Range, text: &str) -> EditOperation {
        EditOperation::replace(Some(EditIdentifier { major, minor }), range, text)
    }

    fn range(s: (usize, usize), e: (usize, usize)) -> Range {
        Range::new(Position::new(s.0, s.1), Position::new(e.0, e.1))
    }

    #[test]
    fn test_conflict_higher_major_loses() {
        let mut edits = vec![
            edit(0, 0, range((1, 1), (1, 5)), "x"),
            edit(1, 0, range((1, 3), (1, 8)), "y"),
        ];
        let losers = resolve_conflicts(&mut edits).expect("primary survives");
        assert_eq!(losers, vec![1]);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].identifier.map(|i| i.major), Some(0));
    }

    #[test]
    fn test_conflict_primary_loser_aborts() {
        // Two of the primary cursor's own edits overlap; the primary would
        // be the loser, so the whole intent must abort.
        let mut edits = vec![
            edit(0, 0, range((1, 1), (1, 5)), "x"),
            edit(0, 1, range((1, 3), (1, 8)), "y"),
        ];
        assert!(resolve_conflicts(&mut edits).is_err());
    }

    #[test]
    fn test_touching_inserts_do_not_conflict() {
        let mut edits = vec![
            edit(0, 0, range((1, 2), (1, 2)), "a"),
            edit(1, 0, range((1, 2), (1, 2)), "b"),
        ];
        let losers = resolve_conflicts(&mut edits).expect("no conflict");
        assert!(losers.is_empty());
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn test_conflict_removes_all_edits_of_loser() {
        let mut edits = vec![
            edit(0, 0, range((1, 1), (1, 5)), "x"),
            edit(1, 0, range((1, 3), (1, 6)), "y"),
            edit(1, 1, range((2, 1), (2, 2)), "z"),
        ];
        let losers = resolve_conflicts(&mut edits).expect("primary survives");
        assert_eq!(losers, vec![1]);
        assert!(edits.iter().all(|e| e.identifier.map(|i| i.major) == Some(0)));
    }

    #[test]
    fn test_trigger_type_single_cursor() {
        let mut model = TextModel::new("");
        let mut controller = CursorController::new(&model, CursorConfig::default());
        controller
            .trigger(&mut model, "test", CursorIntent::Type { text: "hi".into() })
            .expect("type succeeds");
        assert_eq!(model.get_text(), "hi");
        assert_eq!(controller.position(), Position::new(1, 3));
    }

    #[test]
    fn test_set_selections_rejects_empty() {
        let mut model = TextModel::new("abc");
        let mut controller = CursorController::new(&model, CursorConfig::default());
        let result = controller.trigger(
            &mut model,
            "test",
            CursorIntent::SetSelections { selections: Vec::new() },
        );
        assert_eq!(result, Err(CursorError::EmptySelections));
    }

    #[test]
    fn test_move_to_rejects_zero_line() {
        let mut model = TextModel::new("abc");
        let mut controller = CursorController::new(&model, CursorConfig::default());
        let result = controller.trigger(
            &mut model,
            "test",
            CursorIntent::MoveTo { position: Position::new(0, 1), extend: false },
        );
        assert!(matches!(result, Err(CursorError::MalformedPosition { .. })));
    }
}
