//! Text Buffer
//!
//! Piece table: the logical text is an ordered list of pieces, each a slice
//! of one of two backing arrays. The original array holds the text the
//! buffer was created with and is never modified. The append array only
//! grows, so a piece pointing into it stays valid forever.

use std::cell::RefCell;
use std::fmt;

use crate::storage::TextStorage;

/// Which backing array a piece points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSource {
    Original,
    Added,
}

/// A slice of a backing array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub source: PieceSource,
    pub start: usize,
    pub length: usize,
}

impl Piece {
    fn new(source: PieceSource, start: usize, length: usize) -> Self {
        Self { source, start, length }
    }

    fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Cached line-start offsets, rebuilt lazily after a mutation
#[derive(Debug, Default)]
struct LineIndex {
    starts: Vec<usize>,
    dirty: bool,
}

/// Piece-table text buffer
pub struct TextBuffer {
    /// Initial text, never mutated
    original: Vec<char>,
    /// Append-only array for inserted text
    added: Vec<char>,
    /// Gap-free partition of the logical text; no zero-length pieces
    pieces: Vec<Piece>,
    /// Sum of piece lengths
    len: usize,
    line_index: RefCell<LineIndex>,
}

impl TextBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer from a string
    pub fn from_text(text: &str) -> Self {
        let original: Vec<char> = text.chars().collect();
        let len = original.len();
        let pieces = if len == 0 {
            Vec::new()
        } else {
            vec![Piece::new(PieceSource::Original, 0, len)]
        };

        Self {
            original,
            added: Vec::new(),
            pieces,
            len,
            line_index: RefCell::new(LineIndex {
                starts: Vec::new(),
                dirty: true,
            }),
        }
    }

    /// Current pieces, in logical order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Size of the append-only array
    pub fn added_len(&self) -> usize {
        self.added.len()
    }

    fn source(&self, piece: &Piece) -> &[char] {
        let array = match piece.source {
            PieceSource::Original => &self.original,
            PieceSource::Added => &self.added,
        };
        &array[piece.start..piece.end()]
    }

    /// Find the piece containing `position`.
    ///
    /// Returns the piece index and the offset inside it. A position on a
    /// piece boundary reports offset 0 of the following piece; the end of
    /// the text reports `(pieces.len(), 0)`.
    fn locate(&self, position: usize) -> (usize, usize) {
        let mut piece_start = 0;
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece_start + piece.length > position {
                return (index, position - piece_start);
            }
            piece_start += piece.length;
        }
        (self.pieces.len(), 0)
    }

    fn invalidate_lines(&self) {
        self.line_index.borrow_mut().dirty = true;
    }

    fn with_line_starts<R>(&self, f: impl FnOnce(&[usize]) -> R) -> R {
        let mut index = self.line_index.borrow_mut();
        if index.dirty {
            index.starts.clear();
            index.starts.push(0);

            let mut offset = 0;
            for piece in &self.pieces {
                for &c in self.source(piece) {
                    offset += 1;
                    if c == '\n' {
                        index.starts.push(offset);
                    }
                }
            }
            index.dirty = false;
        }
        f(&index.starts)
    }

    fn clamp_line(&self, starts: &[usize], line: usize) -> usize {
        line.min(starts.len() - 1)
    }
}

impl TextStorage for TextBuffer {
    fn insert(&mut self, position: usize, text: &str) {
        if text.is_empty() {
            return;
        }

        let position = position.min(self.len);
        let added_start = self.added.len();
        self.added.extend(text.chars());
        let length = self.added.len() - added_start;

        let (index, offset) = self.locate(position);

        if offset == 0 {
            // Typing at the end of the last insertion just grows that piece
            if index > 0 {
                let previous = &mut self.pieces[index - 1];
                if previous.source == PieceSource::Added && previous.end() == added_start {
                    previous.length += length;
                    self.len += length;
                    self.invalidate_lines();
                    return;
                }
            }
            self.pieces
                .insert(index, Piece::new(PieceSource::Added, added_start, length));
        } else {
            let piece = self.pieces[index];
            let left = Piece::new(piece.source, piece.start, offset);
            let middle = Piece::new(PieceSource::Added, added_start, length);
            let right = Piece::new(piece.source, piece.start + offset, piece.length - offset);
            self.pieces.splice(index..=index, [left, middle, right]);
        }

        self.len += length;
        self.invalidate_lines();
    }

    fn remove(&mut self, position: usize, length: usize) {
        let position = position.min(self.len);
        let length = length.min(self.len - position);
        if length == 0 {
            return;
        }

        let end = position + length;
        let (first, _) = self.locate(position);

        let mut replacement = Vec::with_capacity(2);
        let mut piece_start: usize = self.pieces[..first].iter().map(|p| p.length).sum();
        let mut last = first;

        for (index, piece) in self.pieces.iter().enumerate().skip(first) {
            let piece_end = piece_start + piece.length;
            if piece_start >= end {
                break;
            }
            last = index;

            // Keep whatever sticks out on either side of the removed span
            if piece_start < position {
                replacement.push(Piece::new(piece.source, piece.start, position - piece_start));
            }
            if piece_end > end {
                let cut = end - piece_start;
                replacement.push(Piece::new(piece.source, piece.start + cut, piece.length - cut));
            }

            piece_start = piece_end;
        }

        self.pieces.splice(first..=last, replacement);
        self.len -= length;
        self.invalidate_lines();
    }

    fn text(&self, position: usize, length: usize) -> String {
        let position = position.min(self.len);
        let length = length.min(self.len - position);
        if length == 0 {
            return String::new();
        }

        let end = position + length;
        let mut result = String::with_capacity(length);
        let mut piece_start = 0;

        for piece in &self.pieces {
            let piece_end = piece_start + piece.length;
            if piece_end <= position {
                piece_start = piece_end;
                continue;
            }
            if piece_start >= end {
                break;
            }

            let from = position.saturating_sub(piece_start);
            let to = (end - piece_start).min(piece.length);
            result.extend(&self.source(piece)[from..to]);

            piece_start = piece_end;
        }

        result
    }

    fn len(&self) -> usize {
        self.len
    }

    fn line_count(&self) -> usize {
        self.with_line_starts(|starts| starts.len())
    }

    fn line_start(&self, line: usize) -> usize {
        self.with_line_starts(|starts| starts[self.clamp_line(starts, line)])
    }

    fn line_end(&self, line: usize) -> usize {
        self.with_line_starts(|starts| {
            let line = self.clamp_line(starts, line);
            if line + 1 == starts.len() {
                self.len
            } else {
                starts[line + 1] - 1
            }
        })
    }

    fn position_to_line(&self, position: usize) -> usize {
        let position = position.min(self.len);
        self.with_line_starts(|starts| starts.partition_point(|&start| start <= position) - 1)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("len", &self.len)
            .field("pieces", &self.pieces.len())
            .field("original_len", &self.original.len())
            .field("added_len", &self.added.len())
            .finish()
    }
}
