//! Selection Management
//!
//! Handles text selection and multi-selection operations. Ranges are kept
//! sorted and disjoint; any operation that could break that runs the merge
//! pass afterwards. Operations that need the text take the storage
//! explicitly.

use std::ops::Range;

use evaedit_core::{TextChange, TextChangeListener};
use tracing::trace;

use crate::storage::TextStorage;

/// Selection anchor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Normal character selection
    #[default]
    Character,
    /// Word selection (double-click)
    Word,
    /// Line selection (triple-click)
    Line,
    /// Blank-line delimited paragraph
    Paragraph,
    /// Block/column selection (Alt+drag)
    Block,
}

/// A selected span of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
    pub mode: SelectionMode,
}

impl SelectionRange {
    /// Create a character selection; the bounds may be given in either order
    pub fn new(start: usize, end: usize) -> Self {
        Self::with_mode(start, end, SelectionMode::Character)
    }

    /// Create a selection with a specific mode
    pub fn with_mode(start: usize, end: usize, mode: SelectionMode) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
            mode,
        }
    }

    /// Create an empty selection at a position
    pub fn empty(position: usize) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Check if this selection overlaps or touches another
    pub fn touches(&self, other: &SelectionRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl From<Range<usize>> for SelectionRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[derive(Debug, Clone, Copy)]
struct BlockAnchor {
    start_line: usize,
    start_column: usize,
}

/// Ordered, non-overlapping selections over one document
#[derive(Debug, Default)]
pub struct SelectionManager {
    selections: Vec<SelectionRange>,
    mode: SelectionMode,
    block: Option<BlockAnchor>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selections, sorted by start
    pub fn selections(&self) -> &[SelectionRange] {
        &self.selections
    }

    pub fn selection_count(&self) -> usize {
        self.selections.len()
    }

    pub fn primary_selection(&self) -> Option<&SelectionRange> {
        self.selections.first()
    }

    /// Whether any selection covers at least one char
    pub fn has_selection(&self) -> bool {
        self.selections.iter().any(|s| !s.is_empty())
    }

    /// Replace every selection with `range`
    pub fn set_selection(&mut self, range: SelectionRange) {
        self.selections.clear();
        self.selections.push(range);
    }

    /// Add a selection, merging with any it touches
    pub fn add_selection(&mut self, range: SelectionRange) {
        self.selections.push(range);
        self.merge_overlapping_selections();
    }

    /// Replace every selection with `ranges`, sorted and merged
    pub fn replace_selections(&mut self, ranges: impl IntoIterator<Item = SelectionRange>) {
        self.selections = ranges.into_iter().collect();
        self.merge_overlapping_selections();
    }

    pub fn remove_selection(&mut self, index: usize) {
        if index < self.selections.len() {
            self.selections.remove(index);
        }
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear();
    }

    // Modes

    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch mode, re-expanding existing selections to word or line bounds
    pub fn set_selection_mode(&mut self, mode: SelectionMode, storage: &dyn TextStorage) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;

        for selection in &mut self.selections {
            selection.mode = mode;
            let expanded = match mode {
                SelectionMode::Word => expand_to_words(selection.range(), storage),
                SelectionMode::Line => expand_to_lines(selection.range(), storage),
                SelectionMode::Paragraph => {
                    let first = paragraph_range(selection.start, storage);
                    let last = paragraph_range(selection.end, storage);
                    first.start.min(selection.start)..last.end.max(selection.end)
                }
                SelectionMode::Character | SelectionMode::Block => selection.range(),
            };
            selection.start = expanded.start;
            selection.end = expanded.end;
        }
        self.merge_overlapping_selections();
    }

    // Text-aware selection

    /// Select the word at or just before `position`
    pub fn select_word(&mut self, position: usize, storage: &dyn TextStorage) {
        if let Some(word) = word_range(position, storage) {
            self.set_selection(SelectionRange::with_mode(word.start, word.end, SelectionMode::Word));
        }
    }

    /// Select a whole line, including its newline unless it is the last line
    pub fn select_line(&mut self, line: usize, storage: &dyn TextStorage) {
        if line >= storage.line_count() {
            return;
        }
        let range = line_range(line, storage);
        self.set_selection(SelectionRange::with_mode(range.start, range.end, SelectionMode::Line));
    }

    /// Select the blank-line delimited paragraph around `position`
    pub fn select_paragraph(&mut self, position: usize, storage: &dyn TextStorage) {
        if position > storage.len() {
            return;
        }
        let range = paragraph_range(position, storage);
        self.set_selection(SelectionRange::with_mode(
            range.start,
            range.end,
            SelectionMode::Paragraph,
        ));
    }

    pub fn select_all(&mut self, text_len: usize) {
        self.set_selection(SelectionRange::new(0, text_len));
    }

    // Block selection

    pub fn start_block_selection(&mut self, line: usize, column: usize) {
        self.block = Some(BlockAnchor {
            start_line: line,
            start_column: column,
        });
        self.mode = SelectionMode::Block;
        self.selections.clear();
    }

    /// Select the rectangle between the block anchor and `line`/`column`, one range per line
    pub fn update_block_selection(&mut self, line: usize, column: usize, storage: &dyn TextStorage) {
        let Some(anchor) = self.block else {
            return;
        };

        let last_line = storage.line_count().saturating_sub(1);
        let lines = anchor.start_line.min(line).min(last_line)..=anchor.start_line.max(line).min(last_line);
        let (low, high) = (
            anchor.start_column.min(column),
            anchor.start_column.max(column),
        );

        self.selections = lines
            .map(|line| {
                let start = storage.line_start(line);
                let len = storage.line_length(line);
                SelectionRange::with_mode(
                    start + low.min(len),
                    start + high.min(len),
                    SelectionMode::Block,
                )
            })
            .collect();
    }

    /// Finish the block drag; the rows stay selected
    pub fn end_block_selection(&mut self) {
        self.block = None;
    }

    pub fn is_block_selection_active(&self) -> bool {
        self.block.is_some()
    }

    // Extension

    /// Move the nearest edge of the primary selection to `position`
    pub fn extend_selection_to(&mut self, position: usize) {
        let Some(selection) = self.selections.first_mut() else {
            self.set_selection(SelectionRange::empty(position));
            return;
        };

        if position < selection.start {
            selection.start = position;
        } else if position > selection.end {
            selection.end = position;
        } else if position - selection.start < selection.end - position {
            selection.start = position;
        } else {
            selection.end = position;
        }
        self.merge_overlapping_selections();
    }

    /// Grow the primary selection to cover the word at `position`
    pub fn extend_selection_to_word(&mut self, position: usize, storage: &dyn TextStorage) {
        if self.selections.is_empty() {
            self.select_word(position, storage);
            return;
        }
        if let Some(word) = word_range(position, storage) {
            let selection = &mut self.selections[0];
            selection.start = selection.start.min(word.start);
            selection.end = selection.end.max(word.end);
            self.merge_overlapping_selections();
        }
    }

    /// Grow the primary selection to cover `line`
    pub fn extend_selection_to_line(&mut self, line: usize, storage: &dyn TextStorage) {
        if self.selections.is_empty() {
            self.select_line(line, storage);
            return;
        }
        let range = line_range(line.min(storage.line_count().saturating_sub(1)), storage);
        let selection = &mut self.selections[0];
        selection.start = selection.start.min(range.start);
        selection.end = selection.end.max(range.end);
        self.merge_overlapping_selections();
    }

    // Merging

    pub fn sort_selections(&mut self) {
        self.selections.sort_by_key(|s| (s.start, s.end));
    }

    /// Sort and coalesce touching or overlapping selections
    pub fn merge_overlapping_selections(&mut self) {
        self.sort_selections();

        let mut merged: Vec<SelectionRange> = Vec::with_capacity(self.selections.len());
        for selection in self.selections.drain(..) {
            match merged.last_mut() {
                Some(last) if last.touches(&selection) => {
                    last.end = last.end.max(selection.end);
                }
                _ => merged.push(selection),
            }
        }
        self.selections = merged;
    }

    // Text access

    pub fn selected_texts(&self, storage: &dyn TextStorage) -> Vec<String> {
        self.selections
            .iter()
            .map(|s| storage.text(s.start, s.len()))
            .collect()
    }

    /// All selected text joined by newlines
    pub fn selected_text(&self, storage: &dyn TextStorage) -> String {
        self.selected_texts(storage).join("\n")
    }

    // Bulk selection

    /// Select every occurrence of `pattern`
    pub fn select_all_matches(
        &mut self,
        pattern: &str,
        case_sensitive: bool,
        whole_words: bool,
        storage: &dyn TextStorage,
    ) {
        let needle: Vec<char> = pattern.chars().collect();
        if needle.is_empty() {
            return;
        }
        let text: Vec<char> = storage.full_text().chars().collect();
        let same = |a: char, b: char| {
            if case_sensitive {
                a == b
            } else {
                a.to_lowercase().eq(b.to_lowercase())
            }
        };

        self.selections.clear();
        let mut i = 0;
        while i + needle.len() <= text.len() {
            let end = i + needle.len();
            let matched = text[i..end].iter().zip(&needle).all(|(&a, &b)| same(a, b));
            let bounded = !whole_words
                || ((i == 0 || !is_word_char(text[i - 1]))
                    && (end == text.len() || !is_word_char(text[end])));

            if matched && bounded {
                self.selections.push(SelectionRange::new(i, end));
                i = end;
            } else {
                i += 1;
            }
        }
        trace!("Selected {} matches of {:?}", self.selections.len(), pattern);
    }

    /// Select everything outside the current selections
    pub fn invert_selection(&mut self, text_len: usize) {
        if self.selections.is_empty() {
            self.select_all(text_len);
            return;
        }
        self.merge_overlapping_selections();

        let mut inverted = Vec::new();
        let mut current = 0;
        for selection in &self.selections {
            if current < selection.start {
                inverted.push(SelectionRange::new(current, selection.start));
            }
            current = selection.end;
        }
        if current < text_len {
            inverted.push(SelectionRange::new(current, text_len));
        }
        self.selections = inverted;
    }

    /// Select each word inside `start..end`
    pub fn select_words_in_range(&mut self, start: usize, end: usize, storage: &dyn TextStorage) {
        if start >= end {
            return;
        }
        let text: Vec<char> = storage.text(start, end - start).chars().collect();

        self.selections.clear();
        let mut i = 0;
        while i < text.len() {
            if is_word_char(text[i]) {
                let word_start = i;
                while i < text.len() && is_word_char(text[i]) {
                    i += 1;
                }
                self.selections.push(SelectionRange::with_mode(
                    start + word_start,
                    start + i,
                    SelectionMode::Word,
                ));
            } else {
                i += 1;
            }
        }
    }

    /// Select by what is under `position`: a word, a quoted string, a bracket pair, or the line
    pub fn smart_select(&mut self, position: usize, storage: &dyn TextStorage) {
        if position >= storage.len() {
            return;
        }
        let text: Vec<char> = storage.full_text().chars().collect();
        let ch = text[position];

        let range = if is_word_char(ch) {
            word_range(position, storage)
        } else if matches!(ch, '"' | '\'' | '`') {
            Some(quoted_range(&text, position, ch))
        } else if let Some((open, close)) = bracket_pair(ch) {
            bracket_range(&text, position, open, close)
        } else {
            None
        };

        match range {
            Some(range) => self.set_selection(range.into()),
            None => self.select_line(storage.position_to_line(position), storage),
        }
    }
}

impl TextChangeListener for SelectionManager {
    fn on_text_changed(&mut self, change: &TextChange) {
        if self.selections.is_empty() {
            return;
        }

        let position = change.position;
        let removed_end = change.removed_end();
        let after_insert = position + change.inserted_length();
        let shift = |offset: usize| offset - change.removed_length + change.inserted_length();

        for selection in &mut self.selections {
            selection.start = if selection.start < position {
                selection.start
            } else if selection.start < removed_end {
                after_insert
            } else {
                shift(selection.start)
            };

            // An insertion right at the end does not grow the range
            selection.end = if selection.end <= position {
                selection.end
            } else if selection.end < removed_end {
                after_insert
            } else {
                shift(selection.end)
            };
            selection.end = selection.end.max(selection.start);
        }

        self.selections.retain(|s| !s.is_empty());
        self.merge_overlapping_selections();
    }
}

fn word_range(position: usize, storage: &dyn TextStorage) -> Option<Range<usize>> {
    let position = position.min(storage.len());
    let line = storage.position_to_line(position);
    let line_start = storage.line_start(line);
    let chars: Vec<char> = storage.line(line).chars().collect();
    let offset = position - line_start;

    let mut start = offset;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    (start < end).then(|| line_start + start..line_start + end)
}

fn line_range(line: usize, storage: &dyn TextStorage) -> Range<usize> {
    let start = storage.line_start(line);
    let end = if line + 1 < storage.line_count() {
        storage.line_start(line + 1)
    } else {
        storage.len()
    };
    start..end
}

fn is_blank_line(line: usize, storage: &dyn TextStorage) -> bool {
    storage.line(line).trim().is_empty()
}

fn paragraph_range(position: usize, storage: &dyn TextStorage) -> Range<usize> {
    let line = storage.position_to_line(position);
    if is_blank_line(line, storage) {
        return line_range(line, storage);
    }

    let mut first = line;
    while first > 0 && !is_blank_line(first - 1, storage) {
        first -= 1;
    }
    let mut last = line;
    while last + 1 < storage.line_count() && !is_blank_line(last + 1, storage) {
        last += 1;
    }
    storage.line_start(first)..storage.line_end(last)
}

fn expand_to_words(range: Range<usize>, storage: &dyn TextStorage) -> Range<usize> {
    let start = word_range(range.start, storage).map_or(range.start, |w| w.start);
    let end = word_range(range.end, storage).map_or(range.end, |w| w.end);
    start.min(range.start)..end.max(range.end)
}

fn expand_to_lines(range: Range<usize>, storage: &dyn TextStorage) -> Range<usize> {
    let first = storage.position_to_line(range.start);
    let mut last = storage.position_to_line(range.end);
    // A range ending right after a newline does not pull in the next line
    if last > first && range.end == storage.line_start(last) {
        last -= 1;
    }
    line_range(first, storage).start..line_range(last, storage).end
}

/// The quoted string `position` opens or closes, quotes included
fn quoted_range(text: &[char], position: usize, quote: char) -> Range<usize> {
    let before = text[..position].iter().filter(|&&c| c == quote).count();

    if before % 2 == 0 {
        let end = text[position + 1..]
            .iter()
            .position(|&c| c == quote)
            .map_or(text.len(), |i| position + 1 + i + 1);
        position..end
    } else {
        let start = text[..position].iter().rposition(|&c| c == quote).unwrap_or(0);
        start..position + 1
    }
}

fn bracket_pair(ch: char) -> Option<(char, char)> {
    match ch {
        '(' | ')' => Some(('(', ')')),
        '[' | ']' => Some(('[', ']')),
        '{' | '}' => Some(('{', '}')),
        '<' | '>' => Some(('<', '>')),
        _ => None,
    }
}

/// The bracket pair around `position`, brackets included
fn bracket_range(text: &[char], position: usize, open: char, close: char) -> Option<Range<usize>> {
    let mut depth = 0usize;

    if text[position] == close {
        for i in (0..=position).rev() {
            if text[i] == close {
                depth += 1;
            } else if text[i] == open {
                depth -= 1;
                if depth == 0 {
                    return Some(i..position + 1);
                }
            }
        }
    } else {
        for i in position..text.len() {
            if text[i] == open {
                depth += 1;
            } else if text[i] == close {
                depth -= 1;
                if depth == 0 {
                    return Some(position..i + 1);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use chrono::Utc;

    fn ranges(manager: &SelectionManager) -> Vec<(usize, usize)> {
        manager.selections().iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_add_merges_overlap() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(2, 5));
        manager.add_selection(SelectionRange::new(4, 8));
        assert_eq!(ranges(&manager), vec![(2, 8)]);
    }

    #[test]
    fn test_add_merges_touching_and_sorts() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(10, 12));
        manager.add_selection(SelectionRange::new(0, 3));
        manager.add_selection(SelectionRange::new(3, 5));
        assert_eq!(ranges(&manager), vec![(0, 5), (10, 12)]);

        manager.merge_overlapping_selections();
        assert_eq!(ranges(&manager), vec![(0, 5), (10, 12)]);
    }

    #[test]
    fn test_replace_selections_merges() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(40, 50));
        manager.replace_selections([SelectionRange::new(6, 9), SelectionRange::new(1, 7)]);
        assert_eq!(ranges(&manager), vec![(1, 9)]);
    }

    #[test]
    fn test_normalizes_reversed_bounds() {
        let range = SelectionRange::new(9, 4);
        assert_eq!((range.start, range.end), (4, 9));
    }

    #[test]
    fn test_select_word() {
        let buffer = TextBuffer::from_text("let snake_case1 = 2;");
        let mut manager = SelectionManager::new();

        manager.select_word(7, &buffer);
        assert_eq!(ranges(&manager), vec![(4, 15)]);
        assert_eq!(manager.selected_text(&buffer), "snake_case1");

        manager.select_word(15, &buffer);
        assert_eq!(ranges(&manager), vec![(4, 15)]);

        manager.clear_selections();
        manager.select_word(16, &buffer);
        assert!(manager.selections().is_empty());
    }

    #[test]
    fn test_select_line() {
        let buffer = TextBuffer::from_text("one\ntwo\nthree");
        let mut manager = SelectionManager::new();

        manager.select_line(1, &buffer);
        assert_eq!(manager.selected_text(&buffer), "two\n");

        manager.select_line(2, &buffer);
        assert_eq!(manager.selected_text(&buffer), "three");
    }

    #[test]
    fn test_select_paragraph() {
        let buffer = TextBuffer::from_text("a1\na2\n\nb1\nb2\n  \nc1");
        let mut manager = SelectionManager::new();

        manager.select_paragraph(10, &buffer);
        assert_eq!(manager.selected_text(&buffer), "b1\nb2");

        manager.select_paragraph(0, &buffer);
        assert_eq!(manager.selected_text(&buffer), "a1\na2");
    }

    #[test]
    fn test_block_selection_clips_lines() {
        let buffer = TextBuffer::from_text("abcdef\nab\nabcdefgh");
        let mut manager = SelectionManager::new();

        manager.start_block_selection(0, 1);
        manager.update_block_selection(2, 4, &buffer);
        assert!(manager.is_block_selection_active());
        assert_eq!(manager.selected_texts(&buffer), vec!["bcd", "b", "bcd"]);

        manager.end_block_selection();
        assert!(!manager.is_block_selection_active());
        assert_eq!(manager.selection_count(), 3);
    }

    #[test]
    fn test_adjust_on_insert() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(2, 5));
        manager.add_selection(SelectionRange::new(10, 12));

        manager.on_text_changed(&TextChange::insertion(3, "xx", Utc::now()));
        assert_eq!(ranges(&manager), vec![(2, 7), (12, 14)]);

        manager.on_text_changed(&TextChange::insertion(7, "y", Utc::now()));
        assert_eq!(ranges(&manager), vec![(2, 7), (13, 15)]);
    }

    #[test]
    fn test_adjust_on_remove_prunes_and_merges() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(2, 4));
        manager.add_selection(SelectionRange::new(6, 8));
        manager.add_selection(SelectionRange::new(10, 12));

        manager.on_text_changed(&TextChange::removal(1, 6, Utc::now()));
        assert_eq!(ranges(&manager), vec![(1, 2), (4, 6)]);

        manager.on_text_changed(&TextChange::removal(0, 3, Utc::now()));
        assert_eq!(ranges(&manager), vec![(1, 3)]);
    }

    #[test]
    fn test_mode_switch_expands() {
        let buffer = TextBuffer::from_text("hello world\nsecond line");
        let mut manager = SelectionManager::new();
        manager.set_selection(SelectionRange::new(2, 8));

        manager.set_selection_mode(SelectionMode::Word, &buffer);
        assert_eq!(ranges(&manager), vec![(0, 11)]);

        manager.set_selection_mode(SelectionMode::Line, &buffer);
        assert_eq!(ranges(&manager), vec![(0, 12)]);
        assert_eq!(manager.primary_selection().map(|s| s.mode), Some(SelectionMode::Line));
    }

    #[test]
    fn test_extend_selection() {
        let buffer = TextBuffer::from_text("alpha beta gamma");
        let mut manager = SelectionManager::new();
        manager.set_selection(SelectionRange::new(6, 8));

        manager.extend_selection_to(2);
        assert_eq!(ranges(&manager), vec![(2, 8)]);
        manager.extend_selection_to(7);
        assert_eq!(ranges(&manager), vec![(2, 7)]);

        manager.extend_selection_to_word(12, &buffer);
        assert_eq!(ranges(&manager), vec![(2, 16)]);
    }

    #[test]
    fn test_invert() {
        let mut manager = SelectionManager::new();
        manager.add_selection(SelectionRange::new(2, 4));
        manager.add_selection(SelectionRange::new(6, 10));

        manager.invert_selection(10);
        assert_eq!(ranges(&manager), vec![(0, 2), (4, 6)]);

        manager.clear_selections();
        manager.invert_selection(10);
        assert_eq!(ranges(&manager), vec![(0, 10)]);
    }

    #[test]
    fn test_select_words_in_range() {
        let buffer = TextBuffer::from_text("one, two three");
        let mut manager = SelectionManager::new();

        manager.select_words_in_range(2, 14, &buffer);
        assert_eq!(manager.selected_texts(&buffer), vec!["e", "two", "three"]);
    }

    #[test]
    fn test_select_all_matches() {
        let buffer = TextBuffer::from_text("Cat cat concat CAT");
        let mut manager = SelectionManager::new();

        manager.select_all_matches("cat", false, true, &buffer);
        assert_eq!(ranges(&manager), vec![(0, 3), (4, 7), (15, 18)]);

        manager.select_all_matches("cat", true, false, &buffer);
        assert_eq!(ranges(&manager), vec![(4, 7), (11, 14)]);
    }

    #[test]
    fn test_smart_select() {
        let buffer = TextBuffer::from_text("call(a, (b)) \"quoted\"\n+ rest");
        let mut manager = SelectionManager::new();

        manager.smart_select(4, &buffer);
        assert_eq!(manager.selected_text(&buffer), "(a, (b))");

        manager.smart_select(11, &buffer);
        assert_eq!(manager.selected_text(&buffer), "(a, (b))");

        manager.smart_select(13, &buffer);
        assert_eq!(manager.selected_text(&buffer), "\"quoted\"");

        manager.smart_select(22, &buffer);
        assert_eq!(manager.selected_text(&buffer), "+ rest");
    }
}
