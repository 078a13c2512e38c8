#![warn(missing_docs)]
//! Cursor Core - Headless Multi-Cursor Editing Engine
//!
//! # Overview
//!
//! `cursor-core` is the cursor and selection subsystem of a code editor,
//! extracted as a headless library: N simultaneous cursors over a line-based
//! text buffer, with movement, selection, atomic multi-cursor editing, and
//! undo/redo integration. It owns no rendering and no text storage of its own;
//! it drives any buffer implementing the [`CursorBuffer`] trait (a reference
//! [`TextModel`] backed by a rope is included).
//!
//! # Core Features
//!
//! - **Multi-Cursor Editing**: N cursors produce N edits, applied as one
//!   atomic transaction with deterministic conflict arbitration
//! - **Directional Selections**: anchor/active pairs, so extending a
//!   selection behaves like the caret-drag it models
//! - **Visible-Column Movement**: vertical movement preserves the on-screen
//!   column across tabs and wide characters (UAX #11)
//! - **UTF-16 Columns**: positions address UTF-16 code units and never split
//!   a surrogate pair
//! - **Sticky Tracking**: selections survive edits via buffer-owned markers
//! - **Undo Integration**: multi-cursor edits coalesce into single undo
//!   steps; undo/redo restore the recorded selections verbatim
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  CursorController (intents, events, reveal) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Execution Pipeline (conflicts, markers)    │  ← Orchestration
//! ├─────────────────────────────────────────────┤
//! │  Movement Ops │ Edit Operation Builders     │  ← Per-cursor logic
//! ├─────────────────────────────────────────────┤
//! │  CursorCollection (normalize, primary)      │  ← Cursor state
//! ├─────────────────────────────────────────────┤
//! │  CursorBuffer trait (TextModel reference)   │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use cursor_core::{
//!     CursorConfig, CursorController, CursorIntent, Position, TextModel,
//! };
//!
//! let mut model = TextModel::new("alpha\nbeta\ngamma");
//! let mut cursors = CursorController::new(&model, CursorConfig::default());
//!
//! // A cursor on each line, then type through all of them at once.
//! cursors.trigger(&mut model, "test", CursorIntent::CreateCursor {
//!     position: Position::new(2, 1),
//! }).unwrap();
//! cursors.trigger(&mut model, "test", CursorIntent::CreateCursor {
//!     position: Position::new(3, 1),
//! }).unwrap();
//! cursors.trigger(&mut model, "test", CursorIntent::Type {
//!     text: "> ".to_string(),
//! }).unwrap();
//!
//! assert_eq!(model.get_text(), "> alpha\n> beta\n> gamma");
//!
//! // The whole multi-cursor insertion is one undo step.
//! cursors.trigger(&mut model, "test", CursorIntent::Undo).unwrap();
//! assert_eq!(model.get_text(), "alpha\nbeta\ngamma");
//! ```
//!
//! Subscribing to change events:
//!
//! ```rust
//! use cursor_core::{
//!     CursorConfig, CursorController, CursorEvent, CursorIntent, Movement, TextModel,
//! };
//!
//! let mut model = TextModel::new("hello world");
//! let mut cursors = CursorController::new(&model, CursorConfig::default());
//! cursors.subscribe(Box::new(|event| {
//!     if let CursorEvent::PositionChanged(change) = event {
//!         println!("caret now at {:?} ({:?})", change.position, change.reason);
//!     }
//! }));
//! cursors.trigger(&mut model, "keyboard", CursorIntent::Move {
//!     movement: Movement::WordRight,
//!     extend: false,
//! }).unwrap();
//! ```
//!
//! # Module Description
//!
//! - [`position`] - 1-based line/UTF-16-column positions and ranges
//! - [`selection`] - directional selections (anchor + active)
//! - [`cursor`] - per-cursor model/view selection state
//! - [`collection`] - the ordered cursor set and its normalization
//! - [`movement`] - pure movement operations (visible-column vertical moves)
//! - [`operations`] - edit operation builders (type, paste, delete, indent)
//! - [`commands`] - the pluggable command trait and built-in commands
//! - [`buffer`] - the buffer collaborator trait and marker interface
//! - [`text_model`] - rope-backed reference buffer with undo/redo
//! - [`controller`] - intent dispatch, conflict resolution, events
//! - [`events`] - change/reveal event payloads
//! - [`config`] - tab size, page size, cursor cap and friends
//! - [`error`] - public error type
//!
//! # Coordinate System
//!
//! Lines are 1-based. Columns are 1-based **UTF-16 code unit** offsets: a
//! character outside the Basic Multilingual Plane occupies two columns, and
//! the engine guarantees no position ever lands between its two code units.
//! Visible columns (0-based cells, tabs expanded, wide characters counted
//! per UAX #11) exist only inside vertical movement.

pub mod buffer;
pub mod collection;
pub mod commands;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod events;
pub mod movement;
pub mod operations;
pub mod position;
pub mod selection;
mod text;
pub mod text_model;

pub use buffer::{
    ComputeSelectionsFn, CursorBuffer, EditIdentifier, EditOperation, MarkerId, MarkerStickiness,
    ReverseEdit,
};
pub use collection::CursorCollection;
pub use commands::{
    Command, EditBatch, ReplaceCommand, ShiftLinesCommand, TrackedHandle, TrackedReplaceCommand,
    TrackedSelectionRequest, TransactionOutcome,
};
pub use config::CursorConfig;
pub use controller::{CursorController, CursorIntent};
pub use cursor::{CursorState, SelectionState};
pub use error::CursorError;
pub use events::{
    CursorChangeReason, CursorEvent, CursorEventCallback, PositionChangedEvent, RevealRequest,
    RevealTarget, SelectionChangedEvent,
};
pub use movement::{MoveOutcome, Movement};
pub use operations::EditOperationResult;
pub use position::{Position, Range};
pub use selection::{Selection, SelectionDirection};
pub use text_model::TextModel;
