//! EvaEdit - in-memory text editing engine
//!
//! The editing core behind an editor front end: text storage, undo history,
//! documents, cursors and selections, all synchronized through a single
//! stream of change events.
//!
//! ## Features
//!
//! - **Piece table**: O(pieces) edits without copying the original text
//! - **Paged storage**: very large files split into chunks that spill to disk
//! - **Coalescing undo**: typing and deleting merge into natural undo steps
//! - **Multi-cursor**: sorted, non-overlapping cursors that follow every edit
//! - **Selections**: word, line, paragraph and block modes
//!
//! ## Architecture
//!
//! - `evaedit-core`: errors, configuration, change events, clock service
//! - `evaedit-editor`: storage, undo system, document, cursor and selection managers

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export main components for library usage
pub use evaedit_core as core;
pub use evaedit_editor as editor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use evaedit_core::config::EditorConfig;
    pub use evaedit_core::{
        Clock, EditorError, ManualClock, SharedClock, SystemClock, TextChange, TextChangeListener,
    };
    pub use evaedit_editor::{
        Command, CommandResult, CursorManager, Direction, Document, EditSession, SelectionManager,
        SelectionMode, SelectionRange, TextStorage, UndoSystem,
    };
}
