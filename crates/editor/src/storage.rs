//! Storage Contract
//!
//! The capability every text store offers to the rest of the engine and to
//! rendering, layout and search collaborators. Offsets are char positions
//! into the logical text and are only meaningful until the next mutation.
//! Every offset and length is clamped into range; nothing here fails.

use std::path::Path;

use evaedit_core::config::PagingConfig;
use evaedit_core::Result;
use tracing::info;

use crate::buffer::TextBuffer;
use crate::paged::PagedTextBuffer;

/// Text storage operations
pub trait TextStorage {
    fn insert(&mut self, position: usize, text: &str);
    fn remove(&mut self, position: usize, length: usize);

    /// Replace `length` chars at `position` with `text`
    fn replace(&mut self, position: usize, length: usize, text: &str) {
        let position = position.min(self.len());
        self.remove(position, length);
        self.insert(position, text);
    }

    fn text(&self, position: usize, length: usize) -> String;

    fn full_text(&self) -> String {
        self.text(0, self.len())
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines; an empty text has one line
    fn line_count(&self) -> usize;

    /// Offset of the first char of `line` (clamped to the last line)
    fn line_start(&self, line: usize) -> usize;

    /// Offset just before the line's newline, or the text end on the last line
    fn line_end(&self, line: usize) -> usize;

    fn line_length(&self, line: usize) -> usize {
        self.line_end(line) - self.line_start(line)
    }

    /// Line content without its trailing newline
    fn line(&self, line: usize) -> String {
        let start = self.line_start(line);
        self.text(start, self.line_end(line) - start)
    }

    fn position_to_line(&self, position: usize) -> usize;

    fn position_to_column(&self, position: usize) -> usize {
        let position = position.min(self.len());
        position - self.line_start(self.position_to_line(position))
    }

    fn line_column_to_position(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.line_start(line) + column.min(self.line_length(line))
    }
}

/// Concrete storage chosen once when a document is opened
#[derive(Debug)]
pub enum Storage {
    PieceTable(TextBuffer),
    Paged(PagedTextBuffer),
}

impl Storage {
    /// Storage holding `text` in a piece table
    pub fn from_text(text: &str) -> Self {
        Storage::PieceTable(TextBuffer::from_text(text))
    }

    /// Open a file, choosing paged storage for files over the threshold
    pub fn open(path: &Path, config: &PagingConfig) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();

        if size > config.large_file_threshold {
            info!("Opening {:?} ({} bytes) with paged storage", path, size);
            Ok(Storage::Paged(PagedTextBuffer::open(path, config.clone())?))
        } else {
            let contents = std::fs::read_to_string(path)?;
            info!("Opening {:?} ({} bytes) with piece table", path, size);
            Ok(Storage::PieceTable(TextBuffer::from_text(&contents)))
        }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, Storage::Paged(_))
    }

    fn as_dyn(&self) -> &dyn TextStorage {
        match self {
            Storage::PieceTable(buffer) => buffer,
            Storage::Paged(buffer) => buffer,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn TextStorage {
        match self {
            Storage::PieceTable(buffer) => buffer,
            Storage::Paged(buffer) => buffer,
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage::PieceTable(TextBuffer::new())
    }
}

impl TextStorage for Storage {
    fn insert(&mut self, position: usize, text: &str) {
        self.as_dyn_mut().insert(position, text)
    }

    fn remove(&mut self, position: usize, length: usize) {
        self.as_dyn_mut().remove(position, length)
    }

    fn replace(&mut self, position: usize, length: usize, text: &str) {
        self.as_dyn_mut().replace(position, length, text)
    }

    fn text(&self, position: usize, length: usize) -> String {
        self.as_dyn().text(position, length)
    }

    fn full_text(&self) -> String {
        self.as_dyn().full_text()
    }

    fn len(&self) -> usize {
        self.as_dyn().len()
    }

    fn line_count(&self) -> usize {
        self.as_dyn().line_count()
    }

    fn line_start(&self, line: usize) -> usize {
        self.as_dyn().line_start(line)
    }

    fn line_end(&self, line: usize) -> usize {
        self.as_dyn().line_end(line)
    }

    fn position_to_line(&self, position: usize) -> usize {
        self.as_dyn().position_to_line(position)
    }
}
