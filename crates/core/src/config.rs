//! Engine Configuration
//!
//! Tunables for the text engine:
//! - Undo history size and coalescing limits
//! - Paged storage chunking for large files
//! - Cursor blink timing
//! - Document diagnostics

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EditorError, Result};

/// Undo history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UndoConfig {
    /// Maximum number of undo steps kept
    pub max_steps: usize,
    /// Coalesce adjacent typing/deleting into one undo step
    pub merge_enabled: bool,
    /// Maximum time between two edits that may coalesce
    pub merge_window_ms: u64,
    /// Maximum length of a coalesced insertion
    pub max_insert_merge_len: usize,
    /// Maximum length of a coalesced removal
    pub max_remove_merge_len: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            merge_enabled: true,
            merge_window_ms: 1000,
            max_insert_merge_len: 100,
            max_remove_merge_len: 50,
        }
    }
}

/// Paged (chunked) storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PagingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Files larger than this (bytes) open with paged storage
    pub large_file_threshold: u64,
    /// Name of the side directory holding chunk files
    pub chunk_dir_name: String,
    /// Chunks kept in memory while editing
    pub max_resident_chunks: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            large_file_threshold: 64 * 1024 * 1024,
            chunk_dir_name: ".evaedit_chunks".to_string(),
            max_resident_chunks: 16,
        }
    }
}

/// Cursor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CursorConfig {
    /// Half-period of the blink cycle in milliseconds
    pub blink_interval_ms: u64,
}

impl CursorConfig {
    /// Shortest blink interval accepted
    pub const MIN_BLINK_INTERVAL_MS: u64 = 100;

    /// Blink interval with the lower bound applied
    pub fn effective_blink_interval_ms(&self) -> u64 {
        self.blink_interval_ms.max(Self::MIN_BLINK_INTERVAL_MS)
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            blink_interval_ms: 530,
        }
    }
}

/// Document configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentConfig {
    /// Entries kept in the diagnostic change log
    pub change_log_capacity: usize,
    /// Documents longer than this (chars) report `is_large`
    pub large_document_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            change_log_capacity: 1000,
            large_document_chars: 10 * 1024 * 1024,
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo settings
    pub undo: UndoConfig,
    /// Large-file settings
    pub paging: PagingConfig,
    /// Cursor settings
    pub cursor: CursorConfig,
    /// Document settings
    pub document: DocumentConfig,
}

impl EditorConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "evaedit", "EvaEdit")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load configuration from the default location, writing defaults if absent
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| EditorError::Config("Cannot determine config path".into()))?;

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            info!("Config file not found, using defaults");
            let config = EditorConfig::default();
            config.save_to(&config_file)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml_string()?)?;
        debug!("Config saved to {:?}", path);
        Ok(())
    }

    /// Parse configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.paging.chunk_size == 0 {
            return Err(EditorError::Config("paging.chunk_size must be positive".into()));
        }
        if self.paging.max_resident_chunks == 0 {
            return Err(EditorError::Config(
                "paging.max_resident_chunks must be positive".into(),
            ));
        }
        Ok(())
    }
}
