//! Undo System
//!
//! Linear undo/redo history of self-inverting edit commands. Small adjacent
//! edits typed in quick succession coalesce into one undo step; batches
//! group many edits into one step. History is capped and the oldest steps
//! are dropped for good once the cap is exceeded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use evaedit_core::config::UndoConfig;
use tracing::debug;

use crate::document::DocumentId;
use crate::selection::SelectionRange;

/// The mutation surface commands apply themselves to.
///
/// Every method here changes storage directly and reports exactly one change
/// notification; none of them record history.
pub trait EditTarget {
    fn insert_direct(&mut self, position: usize, text: &str);
    fn remove_direct(&mut self, position: usize, length: usize);
    fn replace_direct(&mut self, position: usize, length: usize, text: &str);
}

/// Cursor and selection placement saved with an undo step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// `(anchor, position)` of every cursor, in order
    pub carets: Vec<(usize, usize)>,
    /// Index of the primary cursor in `carets`
    pub primary: usize,
    pub selections: Vec<SelectionRange>,
}

/// Command lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    Executed,
    Undone,
}

/// What a command does, with enough state to reverse it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert {
        position: usize,
        text: String,
    },
    Remove {
        position: usize,
        removed: String,
    },
    Replace {
        position: usize,
        old_text: String,
        new_text: String,
    },
    Batch {
        label: String,
        commands: Vec<EditCommand>,
    },
}

/// A single undoable edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommand {
    document: DocumentId,
    timestamp: DateTime<Utc>,
    state: CommandState,
    op: EditOp,
    /// Set once another command has been folded in
    coalesced: bool,
    view_before: Option<ViewState>,
    view_after: Option<ViewState>,
}

impl EditCommand {
    pub fn insert(
        document: DocumentId,
        position: usize,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::pending(document, timestamp, EditOp::Insert {
            position,
            text: text.into(),
        })
    }

    /// Removal of `removed`, which must be the text currently at `position`
    pub fn remove(
        document: DocumentId,
        position: usize,
        removed: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::pending(document, timestamp, EditOp::Remove {
            position,
            removed: removed.into(),
        })
    }

    pub fn replace(
        document: DocumentId,
        position: usize,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::pending(document, timestamp, EditOp::Replace {
            position,
            old_text: old_text.into(),
            new_text: new_text.into(),
        })
    }

    fn pending(document: DocumentId, timestamp: DateTime<Utc>, op: EditOp) -> Self {
        Self {
            document,
            timestamp,
            state: CommandState::Pending,
            op,
            coalesced: false,
            view_before: None,
            view_after: None,
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn op(&self) -> &EditOp {
        &self.op
    }

    /// Placement to restore when this step is undone
    pub fn view_before(&self) -> Option<&ViewState> {
        self.view_before.as_ref()
    }

    /// Placement to restore when this step is redone
    pub fn view_after(&self) -> Option<&ViewState> {
        self.view_after.as_ref()
    }

    pub fn set_view_before(&mut self, state: ViewState) {
        self.view_before = Some(state);
    }

    pub fn set_view_after(&mut self, state: ViewState) {
        self.view_after = Some(state);
    }

    /// Apply the command. Does nothing if it is already applied.
    pub fn execute(&mut self, target: &mut dyn EditTarget) {
        if self.state == CommandState::Executed {
            return;
        }

        match &mut self.op {
            EditOp::Insert { position, text } => target.insert_direct(*position, text),
            EditOp::Remove { position, removed } => {
                target.remove_direct(*position, removed.chars().count())
            }
            EditOp::Replace {
                position,
                old_text,
                new_text,
            } => target.replace_direct(*position, old_text.chars().count(), new_text),
            EditOp::Batch { commands, .. } => {
                for command in commands.iter_mut() {
                    command.execute(target);
                }
            }
        }
        self.state = CommandState::Executed;
    }

    /// Reverse the command. Does nothing unless it is currently applied.
    pub fn undo(&mut self, target: &mut dyn EditTarget) {
        if self.state != CommandState::Executed {
            return;
        }

        match &mut self.op {
            EditOp::Insert { position, text } => {
                target.remove_direct(*position, text.chars().count())
            }
            EditOp::Remove { position, removed } => target.insert_direct(*position, removed),
            EditOp::Replace {
                position,
                old_text,
                new_text,
            } => target.replace_direct(*position, new_text.chars().count(), old_text),
            EditOp::Batch { commands, .. } => {
                for command in commands.iter_mut().rev() {
                    command.undo(target);
                }
            }
        }
        self.state = CommandState::Undone;
    }

    /// Whether `next`, issued right after `self`, can join it as one undo step
    pub fn can_merge(&self, next: &EditCommand, config: &UndoConfig) -> bool {
        if self.document != next.document {
            return false;
        }

        let elapsed = (next.timestamp - self.timestamp).num_milliseconds();
        if elapsed < 0 || elapsed as u64 > config.merge_window_ms {
            return false;
        }

        match (&self.op, &next.op) {
            (
                EditOp::Insert { position, text },
                EditOp::Insert {
                    position: next_position,
                    text: next_text,
                },
            ) => {
                let len = text.chars().count();
                *next_position == position + len
                    && !text.contains('\n')
                    && !next_text.contains('\n')
                    && len + next_text.chars().count() <= config.max_insert_merge_len
            }
            (
                EditOp::Remove { position, removed },
                EditOp::Remove {
                    position: next_position,
                    removed: next_removed,
                },
            ) => {
                let backspace = *position > 0 && *next_position == position - 1;
                let delete = next_position == position;

                let single = removed.chars().count() == 1 || self.coalesced;

                single
                    && next_removed.chars().count() == 1
                    && (backspace || delete)
                    && !removed.contains('\n')
                    && !next_removed.contains('\n')
                    && removed.chars().count() + 1 <= config.max_remove_merge_len
            }
            _ => false,
        }
    }

    /// Fold `next` into this command. Callers check `can_merge` first.
    pub fn merge(&mut self, next: EditCommand) {
        match (&mut self.op, next.op) {
            (EditOp::Insert { text, .. }, EditOp::Insert { text: next_text, .. }) => {
                text.push_str(&next_text);
            }
            (
                EditOp::Remove { position, removed },
                EditOp::Remove {
                    position: next_position,
                    removed: next_removed,
                },
            ) => {
                if next_position + 1 == *position {
                    // Backspace: the new char sits before what was already removed
                    removed.insert_str(0, &next_removed);
                    *position = next_position;
                } else {
                    removed.push_str(&next_removed);
                }
            }
            _ => return,
        }
        self.timestamp = next.timestamp;
        self.coalesced = true;
    }

    /// Short human-readable label for history menus
    pub fn description(&self) -> String {
        match &self.op {
            EditOp::Insert { text, .. } => describe_text("Insert", text),
            EditOp::Remove { removed, .. } => describe_text("Delete", removed),
            EditOp::Replace {
                old_text, new_text, ..
            } => {
                let old_len = old_text.chars().count();
                let new_len = new_text.chars().count();
                if old_len <= 20 && new_len <= 20 {
                    format!("Replace '{}' -> '{}'", old_text, new_text)
                } else {
                    format!("Replace {} characters", old_len)
                }
            }
            EditOp::Batch { label, commands } => {
                if label.is_empty() {
                    format!("Batch edit ({} changes)", commands.len())
                } else {
                    label.clone()
                }
            }
        }
    }
}

fn describe_text(verb: &str, text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some('\n'), None) => format!("{} newline", verb),
        (Some('\t'), None) => format!("{} tab", verb),
        (Some(c), None) if c.is_control() => format!("{} character", verb),
        _ => {
            let len = text.chars().count();
            if len <= 20 {
                format!("{} '{}'", verb, text)
            } else {
                format!("{} {} characters", verb, len)
            }
        }
    }
}

#[derive(Debug)]
struct OpenBatch {
    label: String,
    depth: usize,
    commands: Vec<EditCommand>,
}

/// Undo/redo stacks with coalescing and batching
#[derive(Debug)]
pub struct UndoSystem {
    undo_stack: VecDeque<EditCommand>,
    redo_stack: Vec<EditCommand>,
    config: UndoConfig,
    batch: Option<OpenBatch>,
    revision: u64,
}

impl UndoSystem {
    pub fn new(config: UndoConfig) -> Self {
        let mut config = config;
        config.max_steps = config.max_steps.max(1);
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            config,
            batch: None,
            revision: 0,
        }
    }

    /// Apply a new command and record it, merging into the previous step when allowed
    pub fn execute(&mut self, mut command: EditCommand, target: &mut dyn EditTarget) {
        self.revision += 1;

        if let Some(batch) = &mut self.batch {
            command.execute(target);
            batch.commands.push(command);
            self.redo_stack.clear();
            return;
        }

        let mergeable = self.config.merge_enabled
            && self.redo_stack.is_empty()
            && self
                .undo_stack
                .back()
                .map_or(false, |last| last.can_merge(&command, &self.config));

        command.execute(target);

        if mergeable {
            if let Some(last) = self.undo_stack.back_mut() {
                last.merge(command);
                debug!("Merged edit into '{}'", last.description());
                return;
            }
        }

        self.redo_stack.clear();
        self.push_undo(command);
    }

    fn push_undo(&mut self, command: EditCommand) {
        self.undo_stack.push_back(command);
        self.trim();
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.config.max_steps {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!("Undo history full, dropping '{}'", evicted.description());
            }
        }
    }

    /// Undo the newest step. Returns false if there was nothing to undo.
    pub fn undo(&mut self, target: &mut dyn EditTarget) -> bool {
        self.close_batch();

        let Some(mut command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.undo(target);
        debug!("Undid '{}'", command.description());
        self.redo_stack.push(command);
        true
    }

    /// Redo the most recently undone step. Returns false if there was nothing to redo.
    pub fn redo(&mut self, target: &mut dyn EditTarget) -> bool {
        self.close_batch();

        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        command.execute(target);
        debug!("Redid '{}'", command.description());
        self.push_undo(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history, including any open batch
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch = None;
    }

    pub fn max_undo_steps(&self) -> usize {
        self.config.max_steps
    }

    /// Change the history cap; excess steps are dropped immediately
    pub fn set_max_undo_steps(&mut self, steps: usize) {
        self.config.max_steps = steps.max(1);
        self.trim();
    }

    pub fn is_merge_enabled(&self) -> bool {
        self.config.merge_enabled
    }

    pub fn set_merge_enabled(&mut self, enabled: bool) {
        self.config.merge_enabled = enabled;
    }

    /// Start grouping edits into one step. Batches nest; only the outermost end closes it.
    pub fn begin_batch_edit(&mut self, label: &str) {
        match &mut self.batch {
            Some(batch) => batch.depth += 1,
            None => {
                self.batch = Some(OpenBatch {
                    label: label.to_string(),
                    depth: 1,
                    commands: Vec::new(),
                });
            }
        }
    }

    pub fn end_batch_edit(&mut self) {
        let Some(batch) = &mut self.batch else {
            return;
        };
        batch.depth -= 1;
        if batch.depth == 0 {
            self.close_batch();
        }
    }

    pub fn is_batch_active(&self) -> bool {
        self.batch.is_some()
    }

    fn close_batch(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        let Some(first) = batch.commands.first() else {
            debug!("Discarding empty batch '{}'", batch.label);
            return;
        };

        let command = EditCommand {
            document: first.document,
            timestamp: first.timestamp,
            state: CommandState::Executed,
            op: EditOp::Batch {
                label: batch.label,
                commands: batch.commands,
            },
            coalesced: false,
            view_before: None,
            view_after: None,
        };
        self.push_undo(command);
    }

    /// Counter bumped by every recorded edit, merged or not
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Attach cursor placement to the newest step. A merged step keeps the
    /// placement from before its first edit. Ignored while a batch is open.
    pub fn annotate_last(&mut self, before: ViewState, after: ViewState) {
        if self.batch.is_some() {
            return;
        }
        if let Some(last) = self.undo_stack.back_mut() {
            if last.view_before.is_none() {
                last.view_before = Some(before);
            }
            last.view_after = Some(after);
        }
    }

    /// The step `undo` would revert next
    pub fn last_undo_mut(&mut self) -> Option<&mut EditCommand> {
        self.undo_stack.back_mut()
    }

    /// The step `redo` would apply next
    pub fn last_redo_mut(&mut self) -> Option<&mut EditCommand> {
        self.redo_stack.last_mut()
    }

    /// Descriptions of undoable steps, newest first
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(EditCommand::description).collect()
    }

    /// Descriptions of redoable steps, next-to-redo first
    pub fn redo_history(&self) -> Vec<String> {
        self.redo_stack.iter().rev().map(EditCommand::description).collect()
    }
}

impl Default for UndoSystem {
    fn default() -> Self {
        Self::new(UndoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct TestTarget {
        id: DocumentId,
        text: Vec<char>,
        notifications: usize,
    }

    impl TestTarget {
        fn new(text: &str) -> Self {
            Self {
                id: DocumentId::next(),
                text: text.chars().collect(),
                notifications: 0,
            }
        }

        fn text(&self) -> String {
            self.text.iter().collect()
        }

        fn slice(&self, position: usize, length: usize) -> String {
            self.text[position..position + length].iter().collect()
        }
    }

    impl EditTarget for TestTarget {
        fn insert_direct(&mut self, position: usize, text: &str) {
            self.text.splice(position..position, text.chars());
            self.notifications += 1;
        }

        fn remove_direct(&mut self, position: usize, length: usize) {
            self.text.drain(position..position + length);
            self.notifications += 1;
        }

        fn replace_direct(&mut self, position: usize, length: usize, text: &str) {
            self.text.splice(position..position + length, text.chars());
            self.notifications += 1;
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn at_ms(ms: i64) -> DateTime<Utc> {
        t0() + Duration::milliseconds(ms)
    }

    fn type_chars(undo: &mut UndoSystem, target: &mut TestTarget, start: usize, text: &str, gap_ms: i64) {
        for (i, c) in text.chars().enumerate() {
            let cmd = EditCommand::insert(target.id, start + i, c.to_string(), at_ms(i as i64 * gap_ms));
            undo.execute(cmd, target);
        }
    }

    #[test]
    fn test_insert_merge_within_window() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        type_chars(&mut undo, &mut target, 0, "ab", 500);
        assert_eq!(undo.undo_count(), 1);

        undo.undo(&mut target);
        assert_eq!(target.text(), "");
    }

    #[test]
    fn test_insert_merge_outside_window() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        type_chars(&mut undo, &mut target, 0, "ab", 1001);
        assert_eq!(undo.undo_count(), 2);

        undo.undo(&mut target);
        assert_eq!(target.text(), "a");
    }

    #[test]
    fn test_merge_window_slides_with_typing() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        type_chars(&mut undo, &mut target, 0, "abcdef", 400);
        assert_eq!(undo.undo_count(), 1);
    }

    #[test]
    fn test_newline_breaks_merge() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        type_chars(&mut undo, &mut target, 0, "a\nb", 10);
        assert_eq!(undo.undo_count(), 3);
        assert_eq!(undo.undo_history()[1], "Insert newline");
    }

    #[test]
    fn test_insert_merge_length_cap() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        let first = EditCommand::insert(target.id, 0, "x".repeat(99), at_ms(0));
        undo.execute(first, &mut target);
        let second = EditCommand::insert(target.id, 99, "yy", at_ms(10));
        undo.execute(second, &mut target);

        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn test_backspace_chain() {
        let mut target = TestTarget::new("hello");
        let mut undo = UndoSystem::default();

        for (i, pos) in [4usize, 3, 2].into_iter().enumerate() {
            let removed = target.slice(pos, 1);
            let cmd = EditCommand::remove(target.id, pos, removed, at_ms(i as i64 * 100));
            undo.execute(cmd, &mut target);
        }

        assert_eq!(target.text(), "he");
        assert_eq!(undo.undo_count(), 1);
        assert_eq!(undo.undo_history(), vec!["Delete 'llo'"]);

        undo.undo(&mut target);
        assert_eq!(target.text(), "hello");
    }

    #[test]
    fn test_forward_delete_chain() {
        let mut target = TestTarget::new("hello");
        let mut undo = UndoSystem::default();

        for i in 0..3 {
            let removed = target.slice(1, 1);
            let cmd = EditCommand::remove(target.id, 1, removed, at_ms(i * 100));
            undo.execute(cmd, &mut target);
        }

        assert_eq!(target.text(), "ho");
        assert_eq!(undo.undo_count(), 1);
        undo.undo(&mut target);
        assert_eq!(target.text(), "hello");
    }

    #[test]
    fn test_multi_char_remove_never_merges() {
        let mut target = TestTarget::new("abcdef");
        let mut undo = UndoSystem::default();

        undo.execute(EditCommand::remove(target.id, 4, "ef", at_ms(0)), &mut target);
        undo.execute(EditCommand::remove(target.id, 3, "d", at_ms(10)), &mut target);

        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        type_chars(&mut undo, &mut target, 0, "a", 0);
        undo.undo(&mut target);
        assert!(undo.can_redo());

        undo.execute(EditCommand::insert(target.id, 0, "b", at_ms(5000)), &mut target);
        assert!(!undo.can_redo());
        assert_eq!(target.text(), "b");
    }

    #[test]
    fn test_no_merge_while_redo_pending() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        undo.execute(EditCommand::insert(target.id, 0, "a", at_ms(0)), &mut target);
        undo.execute(EditCommand::insert(target.id, 0, "\n", at_ms(10)), &mut target);
        undo.undo(&mut target);
        assert_eq!(target.text(), "a");

        undo.execute(EditCommand::insert(target.id, 1, "b", at_ms(20)), &mut target);
        assert_eq!(undo.undo_count(), 2);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut target = TestTarget::new("hello");
        let mut undo = UndoSystem::default();

        undo.execute(
            EditCommand::replace(target.id, 0, "hello", "bye", at_ms(0)),
            &mut target,
        );
        assert_eq!(target.text(), "bye");

        assert!(undo.undo(&mut target));
        assert_eq!(target.text(), "hello");
        assert!(undo.redo(&mut target));
        assert_eq!(target.text(), "bye");

        assert!(!undo.redo(&mut target));
        assert_eq!(target.notifications, 3);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut target = TestTarget::new("x");
        let mut undo = UndoSystem::default();

        assert!(!undo.undo(&mut target));
        assert!(!undo.redo(&mut target));
        assert_eq!(target.notifications, 0);
    }

    #[test]
    fn test_history_cap_evicts_oldest() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();
        undo.set_merge_enabled(false);

        type_chars(&mut undo, &mut target, 0, "abcde", 0);
        undo.set_max_undo_steps(3);
        assert_eq!(undo.undo_count(), 3);

        while undo.undo(&mut target) {}
        assert_eq!(target.text(), "ab");
    }

    #[test]
    fn test_batch_undoes_as_one() {
        let mut target = TestTarget::new("abc");
        let mut undo = UndoSystem::default();

        undo.begin_batch_edit("Indent");
        undo.begin_batch_edit("inner");
        undo.execute(EditCommand::insert(target.id, 0, "  ", at_ms(0)), &mut target);
        undo.end_batch_edit();
        assert!(undo.is_batch_active());
        undo.execute(EditCommand::insert(target.id, 5, "!", at_ms(1)), &mut target);
        undo.end_batch_edit();

        assert!(!undo.is_batch_active());
        assert_eq!(target.text(), "  abc!");
        assert_eq!(undo.undo_history(), vec!["Indent"]);

        undo.undo(&mut target);
        assert_eq!(target.text(), "abc");
        undo.redo(&mut target);
        assert_eq!(target.text(), "  abc!");
    }

    #[test]
    fn test_empty_batch_discarded() {
        let mut undo = UndoSystem::default();
        undo.begin_batch_edit("nothing");
        undo.end_batch_edit();
        assert!(!undo.can_undo());
    }

    #[test]
    fn test_execute_twice_is_noop() {
        let mut target = TestTarget::new("");
        let mut cmd = EditCommand::insert(target.id, 0, "x", at_ms(0));

        cmd.execute(&mut target);
        cmd.execute(&mut target);
        assert_eq!(target.text(), "x");
        assert_eq!(cmd.state(), CommandState::Executed);

        cmd.undo(&mut target);
        cmd.undo(&mut target);
        assert_eq!(target.text(), "");
        assert_eq!(cmd.state(), CommandState::Undone);
    }

    fn view(caret: usize) -> ViewState {
        ViewState {
            carets: vec![(caret, caret)],
            primary: 0,
            selections: Vec::new(),
        }
    }

    #[test]
    fn test_merged_step_keeps_first_view() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        let revision = undo.revision();
        undo.execute(EditCommand::insert(target.id, 0, "a", at_ms(0)), &mut target);
        assert_ne!(undo.revision(), revision);
        undo.annotate_last(view(0), view(1));

        undo.execute(EditCommand::insert(target.id, 1, "b", at_ms(100)), &mut target);
        undo.annotate_last(view(1), view(2));

        let step = undo.last_undo_mut().unwrap();
        assert_eq!(step.view_before(), Some(&view(0)));
        assert_eq!(step.view_after(), Some(&view(2)));

        undo.undo(&mut target);
        assert_eq!(undo.last_redo_mut().unwrap().view_before(), Some(&view(0)));
    }

    #[test]
    fn test_annotation_waits_for_batch_end() {
        let mut target = TestTarget::new("");
        let mut undo = UndoSystem::default();

        undo.begin_batch_edit("Typing");
        undo.execute(EditCommand::insert(target.id, 0, "x", at_ms(0)), &mut target);
        undo.annotate_last(view(0), view(1));
        undo.end_batch_edit();

        assert_eq!(undo.last_undo_mut().unwrap().view_before(), None);
        undo.annotate_last(view(0), view(1));
        assert_eq!(undo.last_undo_mut().unwrap().view_after(), Some(&view(1)));
    }

    #[test]
    fn test_different_documents_never_merge() {
        let config = UndoConfig::default();
        let a = EditCommand::insert(DocumentId::next(), 0, "a", at_ms(0));
        let b = EditCommand::insert(DocumentId::next(), 1, "b", at_ms(1));
        assert!(!a.can_merge(&b, &config));
    }

    #[test]
    fn test_descriptions() {
        let id = DocumentId::next();
        assert_eq!(EditCommand::insert(id, 0, "\t", t0()).description(), "Insert tab");
        assert_eq!(EditCommand::remove(id, 0, "x", t0()).description(), "Delete 'x'");
        assert_eq!(
            EditCommand::insert(id, 0, "y".repeat(30), t0()).description(),
            "Insert 30 characters"
        );
        assert_eq!(
            EditCommand::replace(id, 0, "a", "b", t0()).description(),
            "Replace 'a' -> 'b'"
        );
    }
}
