//! Change Notification
//!
//! Every edit the engine performs is described by exactly one [`TextChange`].
//! Listeners are called synchronously, in the order they subscribed, before
//! the mutating call returns.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::trace;

/// A single edit: `removed_length` chars at `position` were replaced by `inserted_text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub position: usize,
    pub removed_length: usize,
    pub inserted_text: String,
    pub timestamp: DateTime<Utc>,
}

impl TextChange {
    pub fn insertion(position: usize, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            removed_length: 0,
            inserted_text: text.into(),
            timestamp,
        }
    }

    pub fn removal(position: usize, length: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            position,
            removed_length: length,
            inserted_text: String::new(),
            timestamp,
        }
    }

    pub fn replacement(
        position: usize,
        removed_length: usize,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            position,
            removed_length,
            inserted_text: text.into(),
            timestamp,
        }
    }

    /// Number of chars inserted
    pub fn inserted_length(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Net change in document length
    pub fn delta(&self) -> isize {
        self.inserted_length() as isize - self.removed_length as isize
    }

    /// End of the removed span in pre-edit offsets
    pub fn removed_end(&self) -> usize {
        self.position + self.removed_length
    }

    /// Map a pre-edit offset to its post-edit equivalent.
    ///
    /// Offsets before the edit are unchanged, offsets inside the removed span
    /// land after the inserted text, and offsets at or past the end of the
    /// removed span shift by the delta. An offset exactly at an insertion
    /// point moves past the inserted text.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset < self.position {
            offset
        } else if offset < self.removed_end() {
            self.position + self.inserted_length()
        } else {
            offset - self.removed_length + self.inserted_length()
        }
    }
}

/// Receives change notifications
pub trait TextChangeListener {
    fn on_text_changed(&mut self, change: &TextChange);
}

impl<F> TextChangeListener for F
where
    F: FnMut(&TextChange),
{
    fn on_text_changed(&mut self, change: &TextChange) {
        self(change)
    }
}

/// Shared handle to a listener
pub type SharedListener = Rc<RefCell<dyn TextChangeListener>>;

/// Subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered listener list
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<(ListenerId, SharedListener)>,
    next_id: u64,
}

impl ChangeNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener; it is called after all earlier subscribers
    pub fn subscribe(&mut self, listener: SharedListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver a change to every listener in subscription order
    pub fn emit(&self, change: &TextChange) -> usize {
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_text_changed(change);
        }

        trace!(
            position = change.position,
            removed = change.removed_length,
            inserted = change.inserted_text.len(),
            "Change delivered to {} listeners",
            self.listeners.len()
        );
        self.listeners.len()
    }

    /// Get the number of active listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
