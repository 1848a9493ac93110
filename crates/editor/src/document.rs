//! Document
//!
//! Owns one text storage, its undo history and its listeners. All public
//! mutation goes through the undo system, and every change that reaches
//! storage (including undo and redo) is announced with exactly one
//! [`TextChange`].

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use evaedit_core::clock::system_clock;
use evaedit_core::{
    ChangeNotifier, EditorConfig, ListenerId, Result, SharedClock, SharedListener, TextChange,
};
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

use crate::storage::{Storage, TextStorage};
use crate::undo::{EditCommand, EditTarget, UndoSystem};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique document identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Document flavor, resolved once from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    #[default]
    PlainText,
    Markdown,
    Code,
}

impl DocumentKind {
    /// Get document kind from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("md" | "markdown" | "mdown") => DocumentKind::Markdown,
            Some(
                "rs" | "c" | "h" | "cc" | "cpp" | "hpp" | "cxx" | "py" | "js" | "ts" | "jsx"
                | "tsx" | "java" | "kt" | "go" | "cs" | "swift" | "rb" | "sh" | "qml" | "json"
                | "toml" | "yaml" | "yml" | "xml" | "html" | "css" | "sql" | "lua",
            ) => DocumentKind::Code,
            _ => DocumentKind::PlainText,
        }
    }
}

/// Storage plus everything direct mutation needs
struct DocumentState {
    id: DocumentId,
    storage: Storage,
    notifier: ChangeNotifier,
    change_log: VecDeque<TextChange>,
    change_log_capacity: usize,
    clock: SharedClock,
    modified: bool,
}

impl DocumentState {
    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn emit(&mut self, change: TextChange) {
        self.modified = true;
        self.notifier.emit(&change);

        self.change_log.push_back(change);
        while self.change_log.len() > self.change_log_capacity {
            self.change_log.pop_front();
        }
    }
}

impl fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentState")
            .field("id", &self.id)
            .field("storage", &self.storage)
            .field("notifier", &self.notifier)
            .field("change_log", &self.change_log.len())
            .field("modified", &self.modified)
            .finish()
    }
}

impl EditTarget for DocumentState {
    fn insert_direct(&mut self, position: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let position = position.min(self.storage.len());
        self.storage.insert(position, text);
        let change = TextChange::insertion(position, text, self.now());
        self.emit(change);
    }

    fn remove_direct(&mut self, position: usize, length: usize) {
        let position = position.min(self.storage.len());
        let length = length.min(self.storage.len() - position);
        if length == 0 {
            return;
        }
        self.storage.remove(position, length);
        let change = TextChange::removal(position, length, self.now());
        self.emit(change);
    }

    fn replace_direct(&mut self, position: usize, length: usize, text: &str) {
        let position = position.min(self.storage.len());
        let length = length.min(self.storage.len() - position);
        if length == 0 && text.is_empty() {
            return;
        }
        self.storage.replace(position, length, text);
        let change = TextChange::replacement(position, length, text, self.now());
        self.emit(change);
    }
}

/// An editable document
#[derive(Debug)]
pub struct Document {
    state: DocumentState,
    undo: UndoSystem,
    kind: DocumentKind,
    path: Option<PathBuf>,
    read_only: bool,
    large_document_chars: usize,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document holding `text`
    pub fn from_text(text: &str) -> Self {
        Self::with_config(text, &EditorConfig::default(), system_clock())
    }

    /// Create a document holding `text` with explicit configuration and clock
    pub fn with_config(text: &str, config: &EditorConfig, clock: SharedClock) -> Self {
        Self::from_storage(Storage::from_text(text), config, clock)
    }

    /// Open a file, using paged storage when it is large
    pub fn open(path: &Path, config: &EditorConfig, clock: SharedClock) -> Result<Self> {
        let storage = Storage::open(path, &config.paging)?;
        let mut document = Self::from_storage(storage, config, clock);
        document.kind = DocumentKind::from_path(path);
        document.path = Some(path.to_path_buf());
        info!(
            "Opened {:?} as {:?} ({} chars)",
            path,
            document.kind,
            document.len()
        );
        Ok(document)
    }

    fn from_storage(storage: Storage, config: &EditorConfig, clock: SharedClock) -> Self {
        Self {
            state: DocumentState {
                id: DocumentId::next(),
                storage,
                notifier: ChangeNotifier::new(),
                change_log: VecDeque::new(),
                change_log_capacity: config.document.change_log_capacity,
                clock,
                modified: false,
            },
            undo: UndoSystem::new(config.undo.clone()),
            kind: DocumentKind::PlainText,
            path: None,
            read_only: false,
            large_document_chars: config.document.large_document_chars,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.state.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: DocumentKind) {
        self.kind = kind;
    }

    /// Get the file path, if the document came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read access to the underlying storage
    pub fn storage(&self) -> &dyn TextStorage {
        &self.state.storage
    }

    pub fn is_paged(&self) -> bool {
        self.state.storage.is_paged()
    }

    // Editing

    /// Insert `text` at `position` (clamped). Returns false if nothing changed.
    pub fn insert_text(&mut self, position: usize, text: &str) -> bool {
        if self.read_only || text.is_empty() {
            return false;
        }
        let position = position.min(self.len());
        let command = EditCommand::insert(self.id(), position, text, self.state.now());
        self.undo.execute(command, &mut self.state);
        true
    }

    /// Remove `length` chars at `position` (both clamped). Returns false if nothing changed.
    pub fn remove_text(&mut self, position: usize, length: usize) -> bool {
        let position = position.min(self.len());
        let length = length.min(self.len() - position);
        if self.read_only || length == 0 {
            return false;
        }
        let removed = self.state.storage.text(position, length);
        let command = EditCommand::remove(self.id(), position, removed, self.state.now());
        self.undo.execute(command, &mut self.state);
        true
    }

    /// Replace `length` chars at `position` with `text` as one undo step and one change
    pub fn replace_text(&mut self, position: usize, length: usize, text: &str) -> bool {
        let position = position.min(self.len());
        let length = length.min(self.len() - position);
        if self.read_only {
            return false;
        }
        if length == 0 {
            return self.insert_text(position, text);
        }
        if text.is_empty() {
            return self.remove_text(position, length);
        }

        let old_text = self.state.storage.text(position, length);
        let command = EditCommand::replace(self.id(), position, old_text, text, self.state.now());
        self.undo.execute(command, &mut self.state);
        true
    }

    // Undo

    pub fn undo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        self.undo.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        self.undo.redo(&mut self.state)
    }

    pub fn can_undo(&self) -> bool {
        !self.read_only && self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.read_only && self.undo.can_redo()
    }

    pub fn clear_undo_history(&mut self) {
        self.undo.clear();
    }

    /// Get undo step descriptions, newest first
    pub fn undo_history(&self) -> Vec<String> {
        self.undo.undo_history()
    }

    pub fn redo_history(&self) -> Vec<String> {
        self.undo.redo_history()
    }

    pub fn undo_system(&self) -> &UndoSystem {
        &self.undo
    }

    pub fn undo_system_mut(&mut self) -> &mut UndoSystem {
        &mut self.undo
    }

    /// Group the following edits into a single undo step
    pub fn begin_batch_edit(&mut self, label: &str) {
        self.undo.begin_batch_edit(label);
    }

    pub fn end_batch_edit(&mut self) {
        self.undo.end_batch_edit();
    }

    // State

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        if self.read_only != read_only {
            debug!("Document {} read-only: {}", self.id().value(), read_only);
        }
        self.read_only = read_only;
    }

    pub fn is_modified(&self) -> bool {
        self.state.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.state.modified = modified;
    }

    // Notification

    /// Subscribe to changes; listeners run in subscription order
    pub fn subscribe(&mut self, listener: SharedListener) -> ListenerId {
        self.state.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.state.notifier.unsubscribe(id)
    }

    /// Recent changes, oldest first
    pub fn change_log(&self) -> &VecDeque<TextChange> {
        &self.state.change_log
    }

    // Snapshots

    pub fn create_snapshot(&self) -> String {
        self.full_text()
    }

    /// Replace the whole text, dropping undo history
    pub fn restore_from_snapshot(&mut self, snapshot: &str) -> bool {
        if self.read_only {
            return false;
        }

        let old_len = self.len();
        self.state.storage = Storage::from_text(snapshot);
        self.undo.clear();

        let change = TextChange::replacement(0, old_len, snapshot, self.state.now());
        self.state.emit(change);
        info!(
            "Restored document {} from snapshot ({} chars)",
            self.id().value(),
            self.len()
        );
        true
    }

    // Queries

    pub fn text(&self, position: usize, length: usize) -> String {
        self.state.storage.text(position, length)
    }

    pub fn full_text(&self) -> String {
        self.state.storage.full_text()
    }

    pub fn len(&self) -> usize {
        self.state.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn line_count(&self) -> usize {
        self.state.storage.line_count()
    }

    pub fn line(&self, line: usize) -> String {
        self.state.storage.line(line)
    }

    pub fn position_to_line(&self, position: usize) -> usize {
        self.state.storage.position_to_line(position)
    }

    pub fn position_to_column(&self, position: usize) -> usize {
        self.state.storage.position_to_column(position)
    }

    pub fn line_column_to_position(&self, line: usize, column: usize) -> usize {
        self.state.storage.line_column_to_position(line, column)
    }

    // Statistics

    pub fn character_count(&self) -> usize {
        self.len()
    }

    pub fn word_count(&self) -> usize {
        self.full_text().unicode_words().count()
    }

    /// Count runs of non-blank lines
    pub fn paragraph_count(&self) -> usize {
        let mut count = 0;
        let mut in_paragraph = false;

        for line in 0..self.line_count() {
            let blank = self.line(line).trim().is_empty();
            if !blank && !in_paragraph {
                count += 1;
            }
            in_paragraph = !blank;
        }
        count
    }

    pub fn is_large(&self) -> bool {
        self.len() > self.large_document_chars
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
