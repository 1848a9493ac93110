//! EvaEdit Editor
//!
//! In-memory text editing engine with:
//! - Piece-table text buffer for ordinary files
//! - Chunked, disk-paged buffer for very large files
//! - Coalescing undo/redo with batch edits
//! - Multi-cursor and multi-selection tracking kept in sync through change events

pub mod buffer;
pub mod commands;
pub mod cursor;
pub mod document;
pub mod paged;
pub mod selection;
pub mod storage;
pub mod undo;

pub use buffer::TextBuffer;
pub use commands::{Command, CommandResult, EditSession};
pub use cursor::{BlinkState, Cursor, CursorBlink, CursorManager, Direction};
pub use document::{Document, DocumentId, DocumentKind};
pub use paged::PagedTextBuffer;
pub use selection::{SelectionManager, SelectionMode, SelectionRange};
pub use storage::{Storage, TextStorage};
pub use undo::{CommandState, EditCommand, EditOp, EditTarget, UndoSystem, ViewState};
