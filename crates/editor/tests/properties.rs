//! Property tests: storage against a plain char-vector model, undo
//! idempotence, and cursor/selection ordering after arbitrary edits.

use std::rc::Rc;

use evaedit_core::config::{EditorConfig, PagingConfig};
use evaedit_core::ManualClock;
use evaedit_editor::{
    Command, CursorManager, Document, EditSession, PagedTextBuffer, SelectionManager,
    SelectionRange, TextBuffer, TextStorage,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize, String),
    Remove(usize, usize),
    Replace(usize, usize, String),
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-c \\né]{0,6}").expect("valid regex")
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..80, text_strategy()).prop_map(|(p, t)| Op::Insert(p, t)),
        (0usize..80, 0usize..12).prop_map(|(p, l)| Op::Remove(p, l)),
        (0usize..80, 0usize..12, text_strategy()).prop_map(|(p, l, t)| Op::Replace(p, l, t)),
    ]
}

/// Reference model with the same clamping rules as the storages
#[derive(Debug, Default)]
struct Model(Vec<char>);

impl Model {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Insert(position, text) => {
                let position = (*position).min(self.0.len());
                self.0.splice(position..position, text.chars());
            }
            Op::Remove(position, length) => {
                let position = (*position).min(self.0.len());
                let end = position + (*length).min(self.0.len() - position);
                self.0.drain(position..end);
            }
            Op::Replace(position, length, text) => {
                let position = (*position).min(self.0.len());
                let end = position + (*length).min(self.0.len() - position);
                self.0.splice(position..end, text.chars());
            }
        }
    }

    fn text(&self) -> String {
        self.0.iter().collect()
    }
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        text_strategy().prop_map(Command::InsertText),
        Just(Command::DeleteBackward),
        Just(Command::DeleteForward),
        Just(Command::SelectWord),
        Just(Command::Indent),
        Just(Command::Outdent),
        (0usize..80).prop_map(Command::AddCursor),
        Just(Command::ToggleMultiCursor),
    ]
}

type SessionState = (String, Vec<(usize, usize)>, usize, Vec<SelectionRange>);

/// Everything undo and redo are expected to put back
fn session_state(session: &EditSession) -> SessionState {
    (
        session.document().full_text(),
        session.cursors().carets(),
        session.cursors().primary_index(),
        session.selections().selections().to_vec(),
    )
}

fn apply_storage(storage: &mut dyn TextStorage, op: &Op) {
    match op {
        Op::Insert(position, text) => storage.insert(*position, text),
        Op::Remove(position, length) => storage.remove(*position, *length),
        Op::Replace(position, length, text) => storage.replace(*position, *length, text),
    }
}

fn check_lines(storage: &dyn TextStorage, model: &Model) {
    let newlines = model.0.iter().filter(|c| **c == '\n').count();
    assert_eq!(storage.line_count(), newlines + 1);

    let mut line = 0;
    for (offset, c) in model.0.iter().enumerate() {
        assert_eq!(storage.position_to_line(offset), line);
        if *c == '\n' {
            line += 1;
            assert_eq!(storage.line_start(line), offset + 1);
        }
    }
}

fn apply_document(document: &mut Document, op: &Op) {
    match op {
        Op::Insert(position, text) => {
            document.insert_text(*position, text);
        }
        Op::Remove(position, length) => {
            document.remove_text(*position, *length);
        }
        Op::Replace(position, length, text) => {
            document.replace_text(*position, *length, text);
        }
    }
}

proptest! {
    #[test]
    fn test_piece_table_matches_model(
        initial in text_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut buffer = TextBuffer::from_text(&initial);
        let mut model = Model(initial.chars().collect());

        for op in &ops {
            apply_storage(&mut buffer, op);
            model.apply(op);

            let piece_total: usize = buffer.pieces().iter().map(|p| p.length).sum();
            prop_assert_eq!(piece_total, buffer.len());
            prop_assert!(buffer.pieces().iter().all(|p| p.length > 0));
            prop_assert_eq!(buffer.full_text(), model.text());
        }
        check_lines(&buffer, &model);
    }

    #[test]
    fn test_paged_buffer_matches_model(
        initial in prop::string::string_regex("[a-z\\n]{0,60}").expect("valid regex"),
        ops in prop::collection::vec((op_strategy(), 0usize..16), 0..25),
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PagingConfig {
            chunk_size: 8,
            max_resident_chunks: 1,
            ..PagingConfig::default()
        };
        let mut buffer = PagedTextBuffer::from_text(&initial, dir.path(), config).expect("paged");
        let mut model = Model(initial.chars().collect());

        for (op, unload) in &ops {
            apply_storage(&mut buffer, op);
            model.apply(op);
            prop_assert_eq!(buffer.len(), model.0.len());
            prop_assert!(buffer.loaded_chunk_count() <= 1);

            if buffer.chunk_count() > 0 {
                buffer.unload_chunk(unload % buffer.chunk_count());
            }
            prop_assert_eq!(buffer.full_text(), model.text());
            prop_assert_eq!(buffer.line_count(), model.text().matches('\n').count() + 1);
        }
        check_lines(&buffer, &model);
    }

    #[test]
    fn test_undo_all_redo_all_restores_text(
        initial in text_strategy(),
        steps in prop::collection::vec((op_strategy(), 0i64..1500), 1..30),
    ) {
        let clock = Rc::new(ManualClock::new());
        let mut document = Document::with_config(&initial, &EditorConfig::default(), clock.clone());

        for (op, pause) in &steps {
            clock.advance_ms(*pause);
            apply_document(&mut document, op);
        }
        let edited = document.full_text();

        while document.undo() {}
        prop_assert_eq!(document.full_text(), initial);
        prop_assert!(!document.can_undo());

        while document.redo() {}
        prop_assert_eq!(document.full_text(), edited);
        prop_assert!(!document.can_redo());
    }

    #[test]
    fn test_session_undo_all_redo_all_restores_cursors(
        initial in text_strategy(),
        steps in prop::collection::vec(
            (0usize..80, any::<bool>(), command_strategy(), 0i64..1500),
            1..25,
        ),
        caret in 0usize..80,
    ) {
        let clock = Rc::new(ManualClock::new());
        let document = Document::with_config(&initial, &EditorConfig::default(), clock.clone());
        let mut session = EditSession::new(document);

        for (position, extend, command, pause) in &steps {
            clock.advance_ms(*pause);
            session.cursors_handle().borrow_mut().set_cursor_position(*position, *extend);
            session.execute(command.clone());
        }
        session.cursors_handle().borrow_mut().set_cursor_position(caret, false);
        let edited = session_state(&session);

        while session.document().can_undo() {
            session.execute(Command::Undo);
        }
        prop_assert_eq!(session.document().full_text(), initial);

        while session.document().can_redo() {
            session.execute(Command::Redo);
        }
        prop_assert_eq!(session_state(&session), edited);
    }

    #[test]
    fn test_cursors_stay_sorted_and_disjoint(
        positions in prop::collection::vec(0usize..60, 1..8),
        extend in prop::collection::vec(-5isize..5, 0..4),
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut document = Document::from_text(&"abc\ndef ".repeat(8));
        let cursors = Rc::new(std::cell::RefCell::new(CursorManager::new(document.len())));
        document.subscribe(cursors.clone());

        {
            let mut manager = cursors.borrow_mut();
            manager.set_multi_cursor_mode(true);
            for position in &positions {
                manager.add_cursor(*position);
            }
            for delta in &extend {
                manager.move_cursor(*delta, true);
            }
        }

        for op in &ops {
            apply_document(&mut document, op);

            let manager = cursors.borrow();
            prop_assert!(manager.cursor_count() >= 1);
            for cursor in manager.cursors() {
                prop_assert!(cursor.position() <= document.len());
                prop_assert!(cursor.anchor() <= document.len());
            }
            for pair in manager.cursors().windows(2) {
                prop_assert!(pair[0].position() != pair[1].position());
                prop_assert!(pair[0].selection_end() <= pair[1].selection_start());
            }
        }
    }

    #[test]
    fn test_selections_stay_sorted_and_disjoint(
        ranges in prop::collection::vec((0usize..60, 0usize..60), 1..8),
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut document = Document::from_text(&"word ".repeat(12));
        let selections = Rc::new(std::cell::RefCell::new(SelectionManager::new()));
        document.subscribe(selections.clone());

        for (a, b) in &ranges {
            selections.borrow_mut().add_selection(SelectionRange::new(*a, *b));
        }

        for op in &ops {
            apply_document(&mut document, op);

            let manager = selections.borrow();
            for range in manager.selections() {
                prop_assert!(range.start <= range.end);
            }
            for pair in manager.selections().windows(2) {
                prop_assert!(pair[0].end < pair[1].start);
            }
        }

        let before = selections.borrow().selections().to_vec();
        selections.borrow_mut().merge_overlapping_selections();
        let after = selections.borrow();
        prop_assert_eq!(after.selections(), &before[..]);
    }
}
