//! EvaEdit Core - shared types
//!
//! This crate provides what the editing engine and its collaborators share:
//! the error type, configuration, the change event every component
//! synchronizes through, and the clock service.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::EditorConfig;
pub use error::{EditorError, Result};
pub use events::{ChangeNotifier, ListenerId, SharedListener, TextChange, TextChangeListener};

/// EvaEdit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "EvaEdit";
