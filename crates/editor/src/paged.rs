//! Paged Text Buffer
//!
//! Storage for files too large to keep in memory at once. The text is split
//! into chunks of roughly `chunk_size` chars at line boundaries; each chunk
//! is persisted to a side file and can be evicted from memory and reloaded
//! on demand. Chunks cache their length and newline count so length and
//! line queries only touch the one chunk that contains the target.
//!
//! Chunk I/O is synchronous and blocks the caller. A chunk that cannot be
//! read back is logged and treated as empty.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use evaedit_core::config::PagingConfig;
use evaedit_core::{EditorError, Result};
use lru::LruCache;
use tracing::{debug, warn};

use crate::storage::TextStorage;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

/// Chunk contents: in memory, or only in its side file
#[derive(Debug)]
enum ChunkData {
    Resident(Vec<char>),
    Evicted,
}

#[derive(Debug)]
struct Chunk {
    id: u64,
    data: ChunkData,
    len: usize,
    newlines: usize,
    /// Resident data differs from the side file
    dirty: bool,
}

impl Chunk {
    fn resident(id: u64, data: Vec<char>) -> Self {
        let newlines = count_newlines(&data);
        Self {
            id,
            len: data.len(),
            newlines,
            data: ChunkData::Resident(data),
            dirty: true,
        }
    }

    fn is_resident(&self) -> bool {
        matches!(self.data, ChunkData::Resident(_))
    }
}

fn count_newlines(chars: &[char]) -> usize {
    chars.iter().filter(|&&c| c == '\n').count()
}

/// Chunked, lazily loaded text storage
pub struct PagedTextBuffer {
    chunks: Vec<Chunk>,
    chunk_dir: PathBuf,
    /// Directories `empty` had to create, deepest first
    created_dirs: Vec<PathBuf>,
    config: PagingConfig,
    next_chunk_id: u64,
    /// Resident chunk ids in touch order
    residency: LruCache<u64, ()>,
}

impl PagedTextBuffer {
    /// Open a file, splitting it into chunks next to it
    pub fn open(path: &Path, config: PagingConfig) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EditorError::NotFound(path.to_path_buf()),
            _ => EditorError::Io(e),
        })?;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "buffer".to_string());
        let chunk_dir = parent.join(&config.chunk_dir_name).join(file_name);

        let mut buffer = Self::empty(chunk_dir, config)?;
        let mut reader = BufReader::new(file);
        let mut pending = String::new();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            buffer.ingest_line(&mut pending, &line);
        }
        buffer.flush_pending(&mut pending);

        debug!(
            "Opened {:?} as {} chunks in {:?}",
            path,
            buffer.chunks.len(),
            buffer.chunk_dir
        );
        Ok(buffer)
    }

    /// Build paged storage from in-memory text, keeping chunk files under `chunk_dir`
    pub fn from_text(text: &str, chunk_dir: &Path, config: PagingConfig) -> Result<Self> {
        let mut buffer = Self::empty(chunk_dir.to_path_buf(), config)?;
        let mut pending = String::new();

        for line in text.split_inclusive('\n') {
            buffer.ingest_line(&mut pending, line);
        }
        buffer.flush_pending(&mut pending);

        Ok(buffer)
    }

    fn empty(base_dir: PathBuf, config: PagingConfig) -> Result<Self> {
        let store_id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let chunk_dir = base_dir.join(format!("{}-{}", std::process::id(), store_id));

        let created_dirs: Vec<PathBuf> = chunk_dir
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .map(Path::to_path_buf)
            .collect();
        fs::create_dir_all(&chunk_dir)?;

        Ok(Self {
            chunks: Vec::new(),
            chunk_dir,
            created_dirs,
            config,
            next_chunk_id: 0,
            residency: LruCache::unbounded(),
        })
    }

    /// Directory holding this buffer's chunk files
    pub fn chunk_dir(&self) -> &Path {
        &self.chunk_dir
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks currently held in memory
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_resident()).count()
    }

    pub fn is_chunk_loaded(&self, index: usize) -> bool {
        self.chunks.get(index).map_or(false, Chunk::is_resident)
    }

    /// Length of chunk `index` in chars
    pub fn chunk_len(&self, index: usize) -> Option<usize> {
        self.chunks.get(index).map(|c| c.len)
    }

    /// Bring a chunk into memory. Calling it on a resident chunk is cheap.
    pub fn load_chunk(&mut self, index: usize) {
        if index >= self.chunks.len() {
            return;
        }
        self.make_resident(index);
        self.enforce_residency();
    }

    /// Persist a chunk and drop it from memory. Calling it on an evicted chunk is cheap.
    pub fn unload_chunk(&mut self, index: usize) {
        if index < self.chunks.len() {
            self.evict(index);
        }
    }

    fn chunk_path(&self, id: u64) -> PathBuf {
        self.chunk_dir.join(format!("chunk_{}", id))
    }

    fn ingest_line(&mut self, pending: &mut String, line: &str) {
        let pending_len = pending.chars().count();
        if pending_len > 0 && pending_len + line.chars().count() > self.config.chunk_size {
            self.flush_pending(pending);
        }
        pending.push_str(line);
    }

    fn flush_pending(&mut self, pending: &mut String) {
        if pending.is_empty() {
            return;
        }

        let index = self.chunks.len();
        self.push_chunk(index, pending.chars().collect());
        pending.clear();
        self.split_oversized(index);

        // Freshly built chunks are written out right away so they can be evicted
        let last = self.chunks.len();
        for index in index..last {
            self.persist(index);
        }
        self.enforce_residency();
    }

    fn push_chunk(&mut self, index: usize, data: Vec<char>) {
        let id = self.next_chunk_id;
        self.next_chunk_id += 1;
        self.chunks.insert(index, Chunk::resident(id, data));
        self.residency.push(id, ());
    }

    fn touch(&mut self, id: u64) {
        if self.residency.contains(&id) {
            self.residency.promote(&id);
        } else {
            self.residency.push(id, ());
        }
    }

    fn make_resident(&mut self, index: usize) {
        let id = self.chunks[index].id;
        if !self.chunks[index].is_resident() {
            let path = self.chunk_path(id);
            let chunk = &mut self.chunks[index];

            match fs::read_to_string(&path) {
                Ok(contents) => {
                    let data: Vec<char> = contents.chars().collect();
                    chunk.len = data.len();
                    chunk.newlines = count_newlines(&data);
                    chunk.data = ChunkData::Resident(data);
                    chunk.dirty = false;
                    debug!("Loaded chunk {} ({} chars)", index, chunk.len);
                }
                Err(e) => {
                    warn!(
                        "{}; continuing with it empty",
                        EditorError::Chunk {
                            index,
                            message: e.to_string(),
                        }
                    );
                    chunk.data = ChunkData::Resident(Vec::new());
                    chunk.len = 0;
                    chunk.newlines = 0;
                    chunk.dirty = true;
                }
            }
        }
        self.touch(id);
    }

    /// Write a resident chunk to its side file. Returns false on failure.
    fn persist(&mut self, index: usize) -> bool {
        let id = self.chunks[index].id;
        let path = self.chunk_path(id);
        let chunk = &mut self.chunks[index];

        let ChunkData::Resident(data) = &chunk.data else {
            return true;
        };
        if !chunk.dirty {
            return true;
        }

        let contents: String = data.iter().collect();
        match fs::write(&path, contents) {
            Ok(()) => {
                chunk.dirty = false;
                true
            }
            Err(e) => {
                warn!("Failed to persist chunk {} to {:?}: {}", index, path, e);
                false
            }
        }
    }

    /// Drop a chunk from memory. A chunk that cannot be persisted stays resident.
    fn evict(&mut self, index: usize) -> bool {
        if !self.chunks[index].is_resident() {
            return true;
        }
        if !self.persist(index) {
            return false;
        }

        let id = self.chunks[index].id;
        self.chunks[index].data = ChunkData::Evicted;
        self.residency.pop(&id);
        debug!("Unloaded chunk {}", index);
        true
    }

    fn enforce_residency(&mut self) {
        let limit = self.config.max_resident_chunks.max(1);
        let mut attempts = self.residency.len();

        while self.residency.len() > limit && attempts > 0 {
            attempts -= 1;
            let Some((&id, _)) = self.residency.peek_lru() else {
                break;
            };

            match self.chunks.iter().position(|c| c.id == id) {
                Some(index) => {
                    // Unpersistable chunks go to the back of the queue
                    if !self.evict(index) {
                        self.residency.promote(&id);
                    }
                }
                None => {
                    self.residency.pop_lru();
                }
            }
        }
    }

    fn drop_chunk(&mut self, index: usize) {
        let chunk = self.chunks.remove(index);
        self.residency.pop(&chunk.id);
        let path = self.chunk_path(chunk.id);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                debug!("Could not remove chunk file {:?}: {}", path, e);
            }
        }
    }

    /// Split chunks larger than twice the target size, preferring a newline near the middle
    fn split_oversized(&mut self, index: usize) {
        let chunk_size = self.config.chunk_size.max(1);
        let limit = chunk_size.saturating_mul(2);
        let mut pending = vec![index];

        while let Some(index) = pending.pop() {
            if self.chunks[index].len <= limit {
                continue;
            }
            self.make_resident(index);

            let ChunkData::Resident(data) = &mut self.chunks[index].data else {
                continue;
            };
            let split = split_point(data, chunk_size);
            let tail = data.split_off(split);

            let chunk = &mut self.chunks[index];
            chunk.len = split;
            chunk.newlines = match &chunk.data {
                ChunkData::Resident(data) => count_newlines(data),
                ChunkData::Evicted => 0,
            };
            chunk.dirty = true;

            self.push_chunk(index + 1, tail);
            debug!("Split chunk {} at {}", index, split);

            // Check the tail first so indices below it stay valid
            pending.push(index);
            pending.push(index + 1);
        }
    }

    /// Find the chunk holding `position`; the text end maps into the last chunk
    fn locate(&self, position: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (index, chunk) in self.chunks.iter().enumerate() {
            if position < start + chunk.len {
                return Some((index, position - start));
            }
            start += chunk.len;
        }
        self.chunks.last().map(|c| (self.chunks.len() - 1, c.len))
    }

    /// Read a chunk's chars without changing what is resident
    fn read_chunk(&self, index: usize) -> Cow<'_, [char]> {
        let chunk = &self.chunks[index];
        match &chunk.data {
            ChunkData::Resident(data) => Cow::Borrowed(data.as_slice()),
            ChunkData::Evicted => match fs::read_to_string(self.chunk_path(chunk.id)) {
                Ok(contents) => Cow::Owned(contents.chars().collect()),
                Err(e) => {
                    warn!("Failed to read chunk {}: {}; treating it as empty", index, e);
                    Cow::Owned(Vec::new())
                }
            },
        }
    }

    fn total_newlines(&self) -> usize {
        self.chunks.iter().map(|c| c.newlines).sum()
    }

    /// Offset just after the `n`th newline (1-based) of the whole text
    fn offset_after_newline(&self, n: usize) -> usize {
        let mut seen = 0;
        let mut start = 0;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if seen + chunk.newlines >= n {
                let wanted = n - seen;
                let data = self.read_chunk(index);
                let mut found = 0;
                for (offset, &c) in data.iter().enumerate() {
                    if c == '\n' {
                        found += 1;
                        if found == wanted {
                            return start + offset + 1;
                        }
                    }
                }
                return start + chunk.len;
            }
            seen += chunk.newlines;
            start += chunk.len;
        }
        start
    }
}

fn split_point(data: &[char], chunk_size: usize) -> usize {
    let middle = data.len() / 2;
    let window = (chunk_size / 2).max(1);
    let low = middle.saturating_sub(window).max(1);
    let high = (middle + window).min(data.len() - 1);

    // Nearest newline to the middle, splitting just after it
    let mut best: Option<usize> = None;
    for i in low..=high {
        if data[i - 1] == '\n' {
            let closer = best.map_or(true, |b| i.abs_diff(middle) < b.abs_diff(middle));
            if closer {
                best = Some(i);
            }
        }
    }
    best.unwrap_or(middle)
}

impl TextStorage for PagedTextBuffer {
    fn insert(&mut self, position: usize, text: &str) {
        if text.is_empty() {
            return;
        }

        let position = position.min(self.len());
        let Some((index, offset)) = self.locate(position) else {
            self.push_chunk(0, text.chars().collect());
            self.split_oversized(0);
            self.enforce_residency();
            return;
        };

        self.make_resident(index);
        let chunk = &mut self.chunks[index];
        if let ChunkData::Resident(data) = &mut chunk.data {
            let offset = offset.min(data.len());
            let inserted: Vec<char> = text.chars().collect();
            chunk.newlines += count_newlines(&inserted);
            data.splice(offset..offset, inserted);
            chunk.len = data.len();
            chunk.dirty = true;
        }

        self.split_oversized(index);
        self.enforce_residency();
    }

    fn remove(&mut self, position: usize, length: usize) {
        let total = self.len();
        let position = position.min(total);
        let length = length.min(total - position);
        if length == 0 {
            return;
        }

        let end = position + length;
        let mut start = 0;
        let mut index = 0;

        while index < self.chunks.len() && start < end {
            let chunk_len = self.chunks[index].len;
            let chunk_end = start + chunk_len;
            if chunk_end <= position {
                start = chunk_end;
                index += 1;
                continue;
            }

            let from = position.saturating_sub(start);
            let to = (end - start).min(chunk_len);

            if from == 0 && to == chunk_len {
                // Whole chunk goes; no need to read it
                self.drop_chunk(index);
                start = chunk_end;
                continue;
            }

            self.make_resident(index);
            let chunk = &mut self.chunks[index];
            if let ChunkData::Resident(data) = &mut chunk.data {
                let to = to.min(data.len());
                let from = from.min(to);
                chunk.newlines -= count_newlines(&data[from..to]);
                data.drain(from..to);
                chunk.len = data.len();
                chunk.dirty = true;
            }

            start = chunk_end;
            index += 1;
        }

        let empty: Vec<usize> = (0..self.chunks.len())
            .filter(|&i| self.chunks[i].len == 0)
            .collect();
        for index in empty.into_iter().rev() {
            self.drop_chunk(index);
        }

        self.enforce_residency();
    }

    fn text(&self, position: usize, length: usize) -> String {
        let total = self.len();
        let position = position.min(total);
        let length = length.min(total - position);
        if length == 0 {
            return String::new();
        }

        let end = position + length;
        let mut result = String::with_capacity(length);
        let mut start = 0;

        for index in 0..self.chunks.len() {
            let chunk_end = start + self.chunks[index].len;
            if chunk_end <= position {
                start = chunk_end;
                continue;
            }
            if start >= end {
                break;
            }

            let data = self.read_chunk(index);
            let from = position.saturating_sub(start).min(data.len());
            let to = (end - start).min(data.len());
            if from < to {
                result.extend(&data[from..to]);
            }
            start = chunk_end;
        }

        result
    }

    fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.len).sum()
    }

    fn line_count(&self) -> usize {
        self.total_newlines() + 1
    }

    fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.total_newlines());
        if line == 0 {
            0
        } else {
            self.offset_after_newline(line)
        }
    }

    fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.total_newlines());
        if line == self.total_newlines() {
            self.len()
        } else {
            self.offset_after_newline(line + 1) - 1
        }
    }

    fn position_to_line(&self, position: usize) -> usize {
        let position = position.min(self.len());
        let mut seen = 0;
        let mut start = 0;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if position < start + chunk.len {
                let data = self.read_chunk(index);
                let upto = (position - start).min(data.len());
                return seen + count_newlines(&data[..upto]);
            }
            seen += chunk.newlines;
            start += chunk.len;
        }
        seen
    }
}

impl Drop for PagedTextBuffer {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.chunk_dir) {
            debug!("Could not remove chunk directory {:?}: {}", self.chunk_dir, e);
        }
        // Created parents may be shared with other buffers; remove them only once empty
        for dir in self.created_dirs.iter().skip(1) {
            if fs::remove_dir(dir).is_err() {
                break;
            }
        }
    }
}

impl fmt::Debug for PagedTextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedTextBuffer")
            .field("chunks", &self.chunks.len())
            .field("resident", &self.residency.len())
            .field("len", &self.len())
            .field("chunk_dir", &self.chunk_dir)
            .finish()
    }
}
