//! Editor Commands
//!
//! High-level editor commands executed against an [`EditSession`]: one
//! document plus the cursor and selection managers listening to it.

use std::cell::{Ref, RefCell};
use std::ops::Range;
use std::rc::Rc;

use evaedit_core::ListenerId;
use tracing::debug;

use crate::cursor::{CursorManager, Direction};
use crate::document::Document;
use crate::selection::{SelectionManager, SelectionRange};
use crate::storage::TextStorage;
use crate::undo::ViewState;

const INDENT: &str = "    ";

/// Editor command type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Movement commands
    MoveCursor(Direction),
    MoveToLineStart,
    MoveToLineEnd,
    MoveToDocumentStart,
    MoveToDocumentEnd,

    // Selection commands
    ExtendSelection(Direction),
    SelectAll,
    SelectWord,
    SelectLine,
    SelectParagraph,
    ClearSelection,

    // Edit commands
    InsertChar(char),
    InsertText(String),
    InsertNewline,
    InsertTab,
    DeleteBackward,
    DeleteForward,
    DeleteLine,

    // Clipboard commands
    Copy,
    Cut,
    Paste(String),

    // Undo/Redo
    Undo,
    Redo,

    // Indentation
    Indent,
    Outdent,

    // Multi-cursor
    AddCursor(usize),
    ToggleMultiCursor,
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// A document with its cursors and selections kept in sync
pub struct EditSession {
    document: Document,
    cursors: Rc<RefCell<CursorManager>>,
    selections: Rc<RefCell<SelectionManager>>,
    clipboard: String,
    listeners: [ListenerId; 2],
}

impl EditSession {
    pub fn new(mut document: Document) -> Self {
        let cursors = Rc::new(RefCell::new(CursorManager::new(document.len())));
        let selections = Rc::new(RefCell::new(SelectionManager::new()));

        let listeners = [
            document.subscribe(cursors.clone()),
            document.subscribe(selections.clone()),
        ];

        Self {
            document,
            cursors,
            selections,
            clipboard: String::new(),
            listeners,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access; edits made here still reach cursors and selections
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn cursors(&self) -> Ref<'_, CursorManager> {
        self.cursors.borrow()
    }

    pub fn cursors_handle(&self) -> Rc<RefCell<CursorManager>> {
        self.cursors.clone()
    }

    pub fn selections(&self) -> Ref<'_, SelectionManager> {
        self.selections.borrow()
    }

    pub fn selections_handle(&self) -> Rc<RefCell<SelectionManager>> {
        self.selections.clone()
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Detach the managers and hand back the document
    pub fn into_document(mut self) -> Document {
        for id in self.listeners {
            self.document.unsubscribe(id);
        }
        self.document
    }

    /// Execute a command. Edits record where the cursors were before and
    /// after, so undo and redo can put them back.
    pub fn execute(&mut self, command: Command) -> CommandResult {
        debug!("Executing {:?}", command);

        let before = self.view_state();
        let revision = self.document.undo_system().revision();
        let result = self.run(command);

        if self.document.undo_system().revision() != revision {
            let after = self.view_state();
            self.document.undo_system_mut().annotate_last(before, after);
        }
        result
    }

    fn run(&mut self, command: Command) -> CommandResult {
        match command {
            // Movement commands
            Command::MoveCursor(direction) => self.move_direction(direction, false),
            Command::ExtendSelection(direction) => self.move_direction(direction, true),

            Command::MoveToLineStart => {
                self.cursors
                    .borrow_mut()
                    .move_to_line_start(false, self.document.storage());
                self.mirror_cursor_selections()
            }

            Command::MoveToLineEnd => {
                self.cursors
                    .borrow_mut()
                    .move_to_line_end(false, self.document.storage());
                self.mirror_cursor_selections()
            }

            Command::MoveToDocumentStart => {
                self.cursors.borrow_mut().move_to_document_start(false);
                self.mirror_cursor_selections()
            }

            Command::MoveToDocumentEnd => {
                self.cursors.borrow_mut().move_to_document_end(false);
                self.mirror_cursor_selections()
            }

            // Selection commands
            Command::SelectAll => {
                let len = self.document.len();
                self.selections.borrow_mut().select_all(len);
                self.mirror_primary_selection()
            }

            Command::SelectWord => {
                let position = self.cursors.borrow().cursor_position();
                self.selections
                    .borrow_mut()
                    .select_word(position, self.document.storage());
                self.mirror_primary_selection()
            }

            Command::SelectLine => {
                let line = self.current_line();
                self.selections
                    .borrow_mut()
                    .select_line(line, self.document.storage());
                self.mirror_primary_selection()
            }

            Command::SelectParagraph => {
                let position = self.cursors.borrow().cursor_position();
                self.selections
                    .borrow_mut()
                    .select_paragraph(position, self.document.storage());
                self.mirror_primary_selection()
            }

            Command::ClearSelection => {
                self.cursors.borrow_mut().clear_selection();
                self.selections.borrow_mut().clear_selections();
                CommandResult::ok()
            }

            // Edit commands
            Command::InsertChar(c) => self.insert_at_cursors(&c.to_string()),
            Command::InsertText(text) | Command::Paste(text) => self.insert_at_cursors(&text),
            Command::InsertNewline => self.insert_at_cursors("\n"),
            Command::InsertTab => self.insert_at_cursors("\t"),

            Command::DeleteBackward => self.delete_at_cursors(|position, _| {
                (position > 0).then(|| position - 1..position)
            }),

            Command::DeleteForward => self.delete_at_cursors(|position, len| {
                (position < len).then(|| position..position + 1)
            }),

            Command::DeleteLine => {
                let range = self.line_span(self.current_line());
                if range.is_empty() {
                    return CommandResult::with_message("Nothing to delete");
                }
                self.document.remove_text(range.start, range.len());
                CommandResult::ok()
            }

            // Clipboard commands
            Command::Copy => match self.selected_text() {
                Some(text) => {
                    self.clipboard = text;
                    CommandResult::with_message("Copied to clipboard")
                }
                None => CommandResult::with_message("No selection to copy"),
            },

            Command::Cut => match self.selected_text() {
                Some(text) => {
                    self.clipboard = text;
                    self.delete_at_cursors(|_, _| None);
                    CommandResult::with_message("Cut to clipboard")
                }
                None => CommandResult::with_message("No selection to cut"),
            },

            // Undo/Redo
            Command::Undo => {
                let current = self.view_state();
                if self.document.undo() {
                    let saved = self.document.undo_system_mut().last_redo_mut().and_then(|step| {
                        step.set_view_after(current);
                        step.view_before().cloned()
                    });
                    if let Some(state) = saved {
                        self.restore_view(&state);
                    }
                    CommandResult::with_message("Undone")
                } else {
                    CommandResult::with_message("Nothing to undo")
                }
            }

            Command::Redo => {
                let current = self.view_state();
                if self.document.redo() {
                    let saved = self.document.undo_system_mut().last_undo_mut().and_then(|step| {
                        step.set_view_before(current);
                        step.view_after().cloned()
                    });
                    if let Some(state) = saved {
                        self.restore_view(&state);
                    }
                    CommandResult::with_message("Redone")
                } else {
                    CommandResult::with_message("Nothing to redo")
                }
            }

            // Indentation
            Command::Indent => {
                let lines = self.selected_lines();
                let pinned = self.selection_ends_at_line_start(&lines);

                self.document.begin_batch_edit("Indent");
                for line in lines.rev() {
                    let start = self.document.line_column_to_position(line, 0);
                    self.document.insert_text(start, INDENT);
                }
                self.document.end_batch_edit();

                self.pin_selection_ends(pinned);
                CommandResult::ok()
            }

            Command::Outdent => {
                let lines = self.selected_lines();
                self.document.begin_batch_edit("Outdent");
                for line in lines.rev() {
                    let indent = self
                        .document
                        .line(line)
                        .chars()
                        .take_while(|c| *c == ' ')
                        .count()
                        .min(INDENT.len());
                    if indent > 0 {
                        let start = self.document.line_column_to_position(line, 0);
                        self.document.remove_text(start, indent);
                    }
                }
                self.document.end_batch_edit();
                CommandResult::ok()
            }

            // Multi-cursor
            Command::AddCursor(position) => {
                let mut cursors = self.cursors.borrow_mut();
                if !cursors.is_multi_cursor_mode() {
                    CommandResult::error("Multi-cursor mode is off")
                } else if cursors.add_cursor(position) {
                    CommandResult::with_message(format!("{} cursors", cursors.cursor_count()))
                } else {
                    CommandResult::with_message("Cursor already there")
                }
            }

            Command::ToggleMultiCursor => {
                let mut cursors = self.cursors.borrow_mut();
                let enabled = !cursors.is_multi_cursor_mode();
                cursors.set_multi_cursor_mode(enabled);
                CommandResult::with_message(if enabled {
                    "Multi-cursor mode on"
                } else {
                    "Multi-cursor mode off"
                })
            }
        }
    }

    fn move_direction(&mut self, direction: Direction, extend: bool) -> CommandResult {
        self.cursors
            .borrow_mut()
            .move_direction(direction, extend, self.document.storage());
        self.mirror_cursor_selections()
    }

    fn current_line(&self) -> usize {
        let position = self.cursors.borrow().cursor_position();
        self.document.position_to_line(position)
    }

    /// Lines covered by the primary selection, or the caret line.
    /// A selection ending right after a newline does not include the next line.
    fn selected_lines(&self) -> std::ops::RangeInclusive<usize> {
        let selection = self.cursors.borrow().selection();
        let first = self.document.position_to_line(selection.start);
        let mut last = self.document.position_to_line(selection.end);
        if last > first && self.document.position_to_column(selection.end) == 0 {
            last -= 1;
        }
        first..=last
    }

    /// For the primary selection's anchor and caret, the line whose start they sit on
    fn selection_ends_at_line_start(
        &self,
        lines: &std::ops::RangeInclusive<usize>,
    ) -> Option<(Option<usize>, Option<usize>)> {
        let cursors = self.cursors.borrow();
        if !cursors.has_selection() {
            return None;
        }
        let at_line_start = |offset: usize| {
            let line = self.document.position_to_line(offset);
            (self.document.position_to_column(offset) == 0 && lines.contains(&line))
                .then_some(line)
        };
        Some((
            at_line_start(cursors.anchor_position()),
            at_line_start(cursors.cursor_position()),
        ))
    }

    /// Keep selection ends that sat on a line start there, instead of past the new indent
    fn pin_selection_ends(&mut self, pinned: Option<(Option<usize>, Option<usize>)>) {
        let Some((anchor_line, caret_line)) = pinned else {
            return;
        };
        let line_start = |line: usize| self.document.line_column_to_position(line, 0);
        let mut cursors = self.cursors.borrow_mut();
        let anchor = anchor_line.map_or(cursors.anchor_position(), line_start);
        let caret = caret_line.map_or(cursors.cursor_position(), line_start);
        cursors.set_selection(anchor, caret);
    }

    fn view_state(&self) -> ViewState {
        let cursors = self.cursors.borrow();
        ViewState {
            carets: cursors.carets(),
            primary: cursors.primary_index(),
            selections: self.selections.borrow().selections().to_vec(),
        }
    }

    fn restore_view(&mut self, state: &ViewState) {
        self.cursors
            .borrow_mut()
            .restore_carets(&state.carets, state.primary);
        self.selections
            .borrow_mut()
            .replace_selections(state.selections.iter().copied());
    }

    /// The line with its newline; the last line takes the newline before it instead
    fn line_span(&self, line: usize) -> Range<usize> {
        let storage: &dyn TextStorage = self.document.storage();
        let start = storage.line_start(line);
        if line + 1 < storage.line_count() {
            start..storage.line_start(line + 1)
        } else if line > 0 {
            storage.line_end(line - 1)..storage.len()
        } else {
            start..storage.len()
        }
    }

    fn selected_text(&self) -> Option<String> {
        let selections = self.cursors.borrow().all_selections();
        if selections.is_empty() {
            return None;
        }
        let texts: Vec<String> = selections
            .iter()
            .map(|r| self.document.text(r.start, r.len()))
            .collect();
        Some(texts.join("\n"))
    }

    /// Cursor spans, last first, so each edit leaves earlier offsets valid
    fn cursor_spans(&self) -> Vec<Range<usize>> {
        let cursors = self.cursors.borrow();
        let mut spans: Vec<Range<usize>> = cursors
            .cursors()
            .iter()
            .map(|c| c.selection())
            .collect();
        spans.sort_by_key(|r| std::cmp::Reverse(r.start));
        spans
    }

    fn insert_at_cursors(&mut self, text: &str) -> CommandResult {
        if self.document.is_read_only() {
            return CommandResult::error("Document is read-only");
        }

        let spans = self.cursor_spans();
        let batch = spans.len() > 1;
        if batch {
            self.document.begin_batch_edit("Multi-cursor edit");
        }

        for span in spans {
            if span.is_empty() {
                self.document.insert_text(span.start, text);
            } else {
                self.document.replace_text(span.start, span.len(), text);
            }
        }

        if batch {
            self.document.end_batch_edit();
        }
        CommandResult::ok()
    }

    /// Remove each cursor's selection, or the span `caret_span` picks for a bare caret
    fn delete_at_cursors(
        &mut self,
        caret_span: impl Fn(usize, usize) -> Option<Range<usize>>,
    ) -> CommandResult {
        if self.document.is_read_only() {
            return CommandResult::error("Document is read-only");
        }

        let len = self.document.len();
        let spans: Vec<Range<usize>> = self
            .cursor_spans()
            .into_iter()
            .filter_map(|span| {
                if span.is_empty() {
                    caret_span(span.start, len)
                } else {
                    Some(span)
                }
            })
            .collect();

        let batch = spans.len() > 1;
        if batch {
            self.document.begin_batch_edit("Multi-cursor delete");
        }
        for span in spans {
            self.document.remove_text(span.start, span.len());
        }
        if batch {
            self.document.end_batch_edit();
        }
        CommandResult::ok()
    }

    /// Make the cursor selection match the primary managed selection
    fn mirror_primary_selection(&mut self) -> CommandResult {
        let primary = self.selections.borrow().primary_selection().copied();
        match primary {
            Some(range) => {
                self.cursors.borrow_mut().set_selection(range.start, range.end);
                CommandResult::ok()
            }
            None => CommandResult::with_message("Nothing to select"),
        }
    }

    /// Make the managed selections match what the cursors select
    fn mirror_cursor_selections(&mut self) -> CommandResult {
        let ranges = self.cursors.borrow().all_selections();
        let mut selections = self.selections.borrow_mut();
        selections.clear_selections();
        for range in ranges {
            selections.add_selection(SelectionRange::from(range));
        }
        CommandResult::ok()
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("document", &self.document.id())
            .field("cursors", &self.cursors.borrow().cursor_count())
            .field("selections", &self.selections.borrow().selection_count())
            .finish()
    }
}
