//! Cursor Management
//!
//! Handles cursor position, movement, multi-cursor support and blinking.
//! Cursors follow document edits through the change notifications they
//! receive as a [`TextChangeListener`].

use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use evaedit_core::clock::system_clock;
use evaedit_core::config::CursorConfig;
use evaedit_core::{SharedClock, TextChange, TextChangeListener};
use tracing::trace;

use crate::storage::TextStorage;

/// Cursor movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text cursor with its selection anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Current position
    position: usize,
    /// Where the selection started; equal to `position` when nothing is selected
    anchor: usize,
    /// Preferred column (for vertical movement)
    preferred_column: Option<usize>,
    /// Cursor ID (for multi-cursor)
    id: usize,
}

impl Cursor {
    /// Create a cursor at a position with no selection
    pub fn at(position: usize) -> Self {
        Self {
            position,
            anchor: position,
            preferred_column: None,
            id: 0,
        }
    }

    /// Get the current position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the anchor position
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn has_selection(&self) -> bool {
        self.position != self.anchor
    }

    pub fn selection_start(&self) -> usize {
        self.position.min(self.anchor)
    }

    pub fn selection_end(&self) -> usize {
        self.position.max(self.anchor)
    }

    pub fn selection_length(&self) -> usize {
        self.selection_end() - self.selection_start()
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection_start()..self.selection_end()
    }

    /// Get cursor ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Move to `position`; the anchor follows unless `extend` is set
    fn move_to(&mut self, position: usize, extend: bool) {
        self.position = position;
        if !extend {
            self.anchor = position;
        }
        self.preferred_column = None;
    }

    /// Same caret, a caret strictly inside the other's selection, or intersecting selections
    fn overlaps(&self, other: &Cursor) -> bool {
        if self.position == other.position {
            return true;
        }

        let (a, b) = (self.selection(), other.selection());
        match (self.has_selection(), other.has_selection()) {
            (true, true) => a.start < b.end && b.start < a.end,
            (true, false) => a.start < other.position && other.position < a.end,
            (false, true) => b.start < self.position && self.position < b.end,
            (false, false) => false,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::at(0)
    }
}

/// Caret visibility phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkState {
    Visible,
    Hidden,
}

/// Clock-driven caret blinking
pub struct CursorBlink {
    state: BlinkState,
    interval_ms: u64,
    running: bool,
    paused: bool,
    last_toggle: DateTime<Utc>,
    clock: SharedClock,
}

impl CursorBlink {
    pub fn new(config: &CursorConfig, clock: SharedClock) -> Self {
        let last_toggle = clock.now();
        Self {
            state: BlinkState::Visible,
            interval_ms: config.effective_blink_interval_ms(),
            running: false,
            paused: false,
            last_toggle,
            clock,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
        self.reset();
    }

    /// Stop blinking, leaving the caret visible
    pub fn stop(&mut self) {
        self.running = false;
        self.state = BlinkState::Visible;
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.state = BlinkState::Visible;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.reset();
    }

    /// Show the caret and restart the interval
    pub fn reset(&mut self) {
        self.state = BlinkState::Visible;
        self.last_toggle = self.clock.now();
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.paused
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms.max(CursorConfig::MIN_BLINK_INTERVAL_MS);
    }

    /// Advance to the current time, toggling once per elapsed interval
    pub fn tick(&mut self) -> BlinkState {
        if !self.is_running() {
            return self.state;
        }

        let elapsed = (self.clock.now() - self.last_toggle).num_milliseconds().max(0) as u64;
        let toggles = elapsed / self.interval_ms;
        if toggles % 2 == 1 {
            self.state = match self.state {
                BlinkState::Visible => BlinkState::Hidden,
                BlinkState::Hidden => BlinkState::Visible,
            };
        }
        self.last_toggle += Duration::milliseconds((toggles * self.interval_ms) as i64);
        self.state
    }

    pub fn state(&self) -> BlinkState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == BlinkState::Visible
    }
}

impl std::fmt::Debug for CursorBlink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorBlink")
            .field("state", &self.state)
            .field("interval_ms", &self.interval_ms)
            .field("running", &self.running)
            .field("paused", &self.paused)
            .finish()
    }
}

/// Primary and secondary cursors over one document
#[derive(Debug)]
pub struct CursorManager {
    cursors: Vec<Cursor>,
    primary_id: usize,
    next_id: usize,
    multi_cursor: bool,
    text_len: usize,
    blink: CursorBlink,
}

impl CursorManager {
    /// Create a manager for a text of `text_len` chars
    pub fn new(text_len: usize) -> Self {
        Self::with_clock(text_len, &CursorConfig::default(), system_clock())
    }

    pub fn with_clock(text_len: usize, config: &CursorConfig, clock: SharedClock) -> Self {
        Self {
            cursors: vec![Cursor::at(0)],
            primary_id: 0,
            next_id: 1,
            multi_cursor: false,
            text_len,
            blink: CursorBlink::new(config, clock),
        }
    }

    /// Get all cursors, sorted by position
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// Get cursor count
    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn primary_index(&self) -> usize {
        self.cursors
            .iter()
            .position(|c| c.id == self.primary_id)
            .unwrap_or(0)
    }

    /// Get the primary cursor
    pub fn primary(&self) -> &Cursor {
        &self.cursors[self.primary_index()]
    }

    fn primary_mut(&mut self) -> &mut Cursor {
        let index = self.primary_index();
        &mut self.cursors[index]
    }

    pub fn set_primary_index(&mut self, index: usize) {
        if let Some(cursor) = self.cursors.get(index) {
            self.primary_id = cursor.id;
        }
    }

    pub fn cursor_position(&self) -> usize {
        self.primary().position
    }

    pub fn anchor_position(&self) -> usize {
        self.primary().anchor
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Resynchronize the known text length, clamping every cursor into it
    pub fn set_text_length(&mut self, len: usize) {
        self.text_len = len;
        for cursor in &mut self.cursors {
            cursor.position = cursor.position.min(len);
            cursor.anchor = cursor.anchor.min(len);
        }
        self.normalize();
    }

    // Positioning

    /// Move the primary cursor. With `extend` the anchor stays and a selection grows.
    pub fn set_cursor_position(&mut self, position: usize, extend: bool) {
        let position = position.min(self.text_len);
        self.primary_mut().move_to(position, extend);
        self.after_move();
    }

    pub fn set_anchor_position(&mut self, position: usize) {
        let position = position.min(self.text_len);
        self.primary_mut().anchor = position;
        self.after_move();
    }

    /// Select `start..end` with the primary cursor, caret at `end`
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.text_len;
        let cursor = self.primary_mut();
        cursor.anchor = start.min(len);
        cursor.position = end.min(len);
        cursor.preferred_column = None;
        self.after_move();
    }

    pub fn select_all(&mut self, text_len: usize) {
        self.text_len = text_len;
        self.set_selection(0, text_len);
    }

    /// Collapse every selection onto its caret
    pub fn clear_selection(&mut self) {
        for cursor in &mut self.cursors {
            cursor.anchor = cursor.position;
        }
        self.after_move();
    }

    pub fn has_selection(&self) -> bool {
        self.primary().has_selection()
    }

    /// Get the primary selection range
    pub fn selection(&self) -> Range<usize> {
        self.primary().selection()
    }

    // Multi-cursor

    pub fn is_multi_cursor_mode(&self) -> bool {
        self.multi_cursor
    }

    /// Enable or disable multi-cursor mode. Disabling keeps only the primary.
    pub fn set_multi_cursor_mode(&mut self, enabled: bool) {
        if self.multi_cursor == enabled {
            return;
        }
        self.multi_cursor = enabled;
        if !enabled {
            self.clear_secondary_cursors();
        }
    }

    /// Add a caret at `position`. Returns false outside multi-cursor mode or on a duplicate.
    pub fn add_cursor(&mut self, position: usize) -> bool {
        if !self.multi_cursor {
            return false;
        }
        let position = position.min(self.text_len);
        if self.cursors.iter().any(|c| c.position == position) {
            return false;
        }

        let mut cursor = Cursor::at(position);
        cursor.id = self.next_id;
        self.next_id += 1;
        self.cursors.push(cursor);
        self.normalize();
        trace!("Added cursor at {} ({} total)", position, self.cursors.len());
        true
    }

    /// Remove a cursor. The last cursor stays; removing the primary promotes the first remaining one.
    pub fn remove_cursor(&mut self, index: usize) {
        if index >= self.cursors.len() || self.cursors.len() <= 1 {
            return;
        }
        let removed = self.cursors.remove(index);
        if removed.id == self.primary_id {
            self.primary_id = self.cursors[0].id;
        }
    }

    /// Remove all cursors except primary
    pub fn clear_secondary_cursors(&mut self) {
        let primary = self.primary().clone();
        self.cursors.clear();
        self.cursors.push(primary);
    }

    pub fn all_positions(&self) -> Vec<usize> {
        self.cursors.iter().map(|c| c.position).collect()
    }

    pub fn all_selections(&self) -> Vec<Range<usize>> {
        self.cursors
            .iter()
            .filter(|c| c.has_selection())
            .map(Cursor::selection)
            .collect()
    }

    pub fn is_position_selected(&self, position: usize) -> bool {
        self.cursors.iter().any(|c| c.selection().contains(&position))
    }

    // Movement

    /// Move by `delta` chars: every cursor in multi-cursor mode, otherwise the primary
    pub fn move_cursor(&mut self, delta: isize, extend: bool) {
        let len = self.text_len;
        self.for_each_moving(|cursor| {
            let target = clamp_offset(cursor.position, delta, len);
            cursor.move_to(target, extend);
        });
    }

    /// Move in a direction; vertical moves keep a sticky preferred column
    pub fn move_direction(&mut self, direction: Direction, extend: bool, storage: &dyn TextStorage) {
        self.text_len = storage.len();
        let len = self.text_len;

        self.for_each_moving(|cursor| match direction {
            Direction::Left => cursor.move_to(clamp_offset(cursor.position, -1, len), extend),
            Direction::Right => cursor.move_to(clamp_offset(cursor.position, 1, len), extend),
            Direction::Up | Direction::Down => {
                let line = storage.position_to_line(cursor.position);
                let column = storage.position_to_column(cursor.position);
                let preferred = cursor.preferred_column.unwrap_or(column);

                let target_line = match direction {
                    Direction::Up if line > 0 => line - 1,
                    Direction::Down if line + 1 < storage.line_count() => line + 1,
                    _ => return,
                };
                let target = storage.line_column_to_position(target_line, preferred);
                cursor.move_to(target, extend);
                cursor.preferred_column = Some(preferred);
            }
        });
    }

    /// Move the primary cursor to a line and column, both clamped
    pub fn move_to_line_column(
        &mut self,
        line: usize,
        column: usize,
        extend: bool,
        storage: &dyn TextStorage,
    ) {
        self.text_len = storage.len();
        let target = storage.line_column_to_position(line, column);
        self.set_cursor_position(target, extend);
    }

    /// Move to the start of the line
    pub fn move_to_line_start(&mut self, extend: bool, storage: &dyn TextStorage) {
        self.for_each_moving(|cursor| {
            let line = storage.position_to_line(cursor.position);
            cursor.move_to(storage.line_start(line), extend);
        });
    }

    /// Move to the end of the line
    pub fn move_to_line_end(&mut self, extend: bool, storage: &dyn TextStorage) {
        self.for_each_moving(|cursor| {
            let line = storage.position_to_line(cursor.position);
            cursor.move_to(storage.line_end(line), extend);
        });
    }

    /// Move to the start of the document
    pub fn move_to_document_start(&mut self, extend: bool) {
        self.for_each_moving(|cursor| cursor.move_to(0, extend));
    }

    /// Move to the end of the document
    pub fn move_to_document_end(&mut self, extend: bool) {
        let len = self.text_len;
        self.for_each_moving(|cursor| cursor.move_to(len, extend));
    }

    fn for_each_moving(&mut self, mut f: impl FnMut(&mut Cursor)) {
        if self.multi_cursor {
            for cursor in &mut self.cursors {
                f(cursor);
            }
        } else {
            f(self.primary_mut());
        }
        self.after_move();
    }

    fn after_move(&mut self) {
        self.normalize();
        self.blink.reset();
    }

    /// Sort cursors and merge any that coincide or whose selections overlap
    fn normalize(&mut self) {
        self.cursors
            .sort_by_key(|c| (c.selection_start(), c.selection_end(), c.position));

        let mut merged: Vec<Cursor> = Vec::with_capacity(self.cursors.len());
        for cursor in self.cursors.drain(..) {
            match merged.last_mut() {
                Some(last) if last.overlaps(&cursor) => {
                    let start = last.selection_start().min(cursor.selection_start());
                    let end = last.selection_end().max(cursor.selection_end());
                    let forward = last.position >= last.anchor;
                    if cursor.id == self.primary_id {
                        last.id = cursor.id;
                    }
                    if last.has_selection() || cursor.has_selection() {
                        (last.anchor, last.position) = if forward { (start, end) } else { (end, start) };
                    }
                }
                _ => merged.push(cursor),
            }
        }
        self.cursors = merged;
    }

    // Snapshots

    /// `(anchor, position)` of every cursor, in order
    pub fn carets(&self) -> Vec<(usize, usize)> {
        self.cursors.iter().map(|c| (c.anchor, c.position)).collect()
    }

    /// Replace every cursor with `carets`, making `carets[primary]` the primary.
    /// Outside multi-cursor mode only the primary is restored.
    pub fn restore_carets(&mut self, carets: &[(usize, usize)], primary: usize) {
        let Some(&primary_caret) = carets.get(primary).or_else(|| carets.first()) else {
            return;
        };
        let carets = if self.multi_cursor {
            carets
        } else {
            std::slice::from_ref(&primary_caret)
        };

        let len = self.text_len;
        let mut restored = Vec::with_capacity(carets.len());
        for &(anchor, position) in carets {
            let mut cursor = Cursor::at(position.min(len));
            cursor.anchor = anchor.min(len);
            cursor.id = self.next_id;
            self.next_id += 1;
            if (anchor, position) == primary_caret {
                self.primary_id = cursor.id;
            }
            restored.push(cursor);
        }

        self.cursors = restored;
        self.after_move();
    }

    // Blinking

    pub fn blink(&self) -> &CursorBlink {
        &self.blink
    }

    pub fn blink_mut(&mut self) -> &mut CursorBlink {
        &mut self.blink
    }
}

impl Default for CursorManager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TextChangeListener for CursorManager {
    fn on_text_changed(&mut self, change: &TextChange) {
        self.text_len = (self.text_len as isize + change.delta()).max(0) as usize;
        let len = self.text_len;

        let mut moved = false;
        for cursor in &mut self.cursors {
            let position = change.map_offset(cursor.position).min(len);
            moved |= position != cursor.position;
            cursor.position = position;
            cursor.anchor = change.map_offset(cursor.anchor).min(len);
            cursor.preferred_column = None;
        }
        self.normalize();
        if moved {
            self.blink.reset();
        }
    }
}

fn clamp_offset(position: usize, delta: isize, len: usize) -> usize {
    (position as isize + delta).clamp(0, len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use chrono::Utc;
    use evaedit_core::ManualClock;
    use std::rc::Rc;

    fn multi(len: usize) -> CursorManager {
        let mut manager = CursorManager::new(len);
        manager.set_multi_cursor_mode(true);
        manager
    }

    fn assert_sorted_disjoint(manager: &CursorManager) {
        for pair in manager.cursors().windows(2) {
            assert!(pair[0].selection_start() <= pair[1].selection_start());
            assert_ne!(pair[0].position(), pair[1].position());
            assert!(pair[0].selection_end() <= pair[1].selection_start());
        }
    }

    #[test]
    fn test_extend_keeps_anchor() {
        let mut manager = CursorManager::new(20);
        manager.set_cursor_position(5, false);
        manager.set_cursor_position(9, true);

        assert_eq!(manager.anchor_position(), 5);
        assert_eq!(manager.selection(), 5..9);

        manager.set_cursor_position(2, false);
        assert!(!manager.has_selection());
    }

    #[test]
    fn test_position_clamped_to_text() {
        let mut manager = CursorManager::new(4);
        manager.set_cursor_position(100, false);
        assert_eq!(manager.cursor_position(), 4);

        manager.move_cursor(-10, false);
        assert_eq!(manager.cursor_position(), 0);
    }

    #[test]
    fn test_add_cursor_duplicate() {
        let mut manager = multi(20);
        assert!(manager.add_cursor(5));
        assert!(!manager.add_cursor(5));
        assert_eq!(manager.cursor_count(), 2);
    }

    #[test]
    fn test_add_cursor_requires_multi_mode() {
        let mut manager = CursorManager::new(20);
        assert!(!manager.add_cursor(5));
        assert_eq!(manager.cursor_count(), 1);
    }

    #[test]
    fn test_disabling_multi_mode_keeps_primary() {
        let mut manager = multi(20);
        manager.set_cursor_position(7, false);
        manager.add_cursor(2);
        manager.add_cursor(12);

        manager.set_multi_cursor_mode(false);
        assert_eq!(manager.cursor_count(), 1);
        assert_eq!(manager.cursor_position(), 7);
    }

    #[test]
    fn test_moving_merges_cursors() {
        let mut manager = multi(20);
        manager.add_cursor(1);
        manager.add_cursor(3);

        manager.move_cursor(-5, false);
        assert_eq!(manager.cursor_count(), 1);
        assert_eq!(manager.cursor_position(), 0);
    }

    #[test]
    fn test_overlapping_selections_merge() {
        let mut manager = multi(30);
        manager.set_selection(2, 6);
        manager.add_cursor(10);
        manager.move_cursor(5, true);

        assert_eq!(manager.cursor_count(), 1);
        assert_eq!(manager.selection(), 2..15);
        assert_eq!(manager.cursor_position(), 15);
        assert_sorted_disjoint(&manager);
    }

    #[test]
    fn test_primary_survives_sorting() {
        let mut manager = multi(30);
        manager.set_cursor_position(20, false);
        manager.add_cursor(3);
        manager.add_cursor(10);

        assert_eq!(manager.all_positions(), vec![3, 10, 20]);
        assert_eq!(manager.primary_index(), 2);
        assert_eq!(manager.cursor_position(), 20);
    }

    #[test]
    fn test_remove_primary_promotes_first() {
        let mut manager = multi(30);
        manager.set_cursor_position(20, false);
        manager.add_cursor(3);

        manager.remove_cursor(1);
        assert_eq!(manager.cursor_position(), 3);
        manager.remove_cursor(0);
        assert_eq!(manager.cursor_count(), 1);
    }

    #[test]
    fn test_vertical_movement_sticky_column() {
        let buffer = TextBuffer::from_text("long line\nab\nanother line");
        let mut manager = CursorManager::new(buffer.len());
        manager.set_cursor_position(7, false);

        manager.move_direction(Direction::Down, false, &buffer);
        assert_eq!(manager.cursor_position(), 12);

        manager.move_direction(Direction::Down, false, &buffer);
        assert_eq!(manager.cursor_position(), 20);

        manager.move_direction(Direction::Up, false, &buffer);
        manager.move_direction(Direction::Up, false, &buffer);
        assert_eq!(manager.cursor_position(), 7);

        manager.move_direction(Direction::Up, false, &buffer);
        assert_eq!(manager.cursor_position(), 7);
    }

    #[test]
    fn test_line_start_end() {
        let buffer = TextBuffer::from_text("abc\ndefg");
        let mut manager = CursorManager::new(buffer.len());
        manager.set_cursor_position(5, false);

        manager.move_to_line_end(false, &buffer);
        assert_eq!(manager.cursor_position(), 8);
        manager.move_to_line_start(true, &buffer);
        assert_eq!(manager.selection(), 4..8);

        manager.move_to_line_column(0, 99, false, &buffer);
        assert_eq!(manager.cursor_position(), 3);
    }

    #[test]
    fn test_follows_text_changes() {
        let mut manager = multi(10);
        manager.set_cursor_position(2, false);
        manager.add_cursor(8);

        manager.on_text_changed(&TextChange::insertion(0, "abc", Utc::now()));
        assert_eq!(manager.all_positions(), vec![5, 11]);
        assert_eq!(manager.text_len(), 13);

        manager.on_text_changed(&TextChange::removal(4, 8, Utc::now()));
        assert_eq!(manager.all_positions(), vec![4]);
        assert_eq!(manager.text_len(), 5);
    }

    #[test]
    fn test_blink_cycle() {
        let clock = Rc::new(ManualClock::new());
        let mut manager = CursorManager::with_clock(10, &CursorConfig::default(), clock.clone());
        manager.blink_mut().start();

        clock.advance_ms(529);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Visible);
        clock.advance_ms(1);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Hidden);
        clock.advance_ms(530 * 2);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Hidden);

        manager.set_cursor_position(3, false);
        assert!(manager.blink().is_visible());
        clock.advance_ms(300);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Visible);
    }

    #[test]
    fn test_edit_driven_move_shows_caret() {
        let clock = Rc::new(ManualClock::new());
        let mut manager = CursorManager::with_clock(10, &CursorConfig::default(), clock.clone());
        manager.blink_mut().start();

        clock.advance_ms(530);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Hidden);

        manager.on_text_changed(&TextChange::insertion(0, "x", Utc::now()));
        assert_eq!(manager.cursor_position(), 1);
        assert!(manager.blink().is_visible());

        // An edit after the caret leaves the blink phase alone
        clock.advance_ms(530);
        assert_eq!(manager.blink_mut().tick(), BlinkState::Hidden);
        manager.on_text_changed(&TextChange::insertion(5, "y", Utc::now()));
        assert!(!manager.blink().is_visible());
    }

    #[test]
    fn test_carets_round_trip() {
        let mut manager = multi(30);
        manager.add_cursor(10);
        manager.add_cursor(20);
        manager.set_primary_index(1);
        manager.move_cursor(2, true);

        let carets = manager.carets();
        let primary = manager.primary_index();
        assert_eq!(carets, vec![(0, 2), (10, 12), (20, 22)]);

        manager.clear_secondary_cursors();
        manager.set_cursor_position(5, false);
        manager.restore_carets(&carets, primary);

        assert_eq!(manager.carets(), carets);
        assert_eq!(manager.primary_index(), 1);
        assert_eq!(manager.selection(), 10..12);
    }

    #[test]
    fn test_restore_carets_single_mode_keeps_primary() {
        let mut manager = CursorManager::new(30);
        manager.restore_carets(&[(1, 1), (8, 4)], 1);
        assert_eq!(manager.carets(), vec![(8, 4)]);
    }

    #[test]
    fn test_blink_paused_and_interval_floor() {
        let clock = Rc::new(ManualClock::new());
        let mut blink = CursorBlink::new(&CursorConfig::default(), clock.clone());
        blink.start();
        blink.pause();

        clock.advance_ms(5000);
        assert_eq!(blink.tick(), BlinkState::Visible);

        blink.set_interval_ms(10);
        assert_eq!(blink.interval_ms(), CursorConfig::MIN_BLINK_INTERVAL_MS);
    }
}
