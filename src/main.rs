//! EvaEdit - text engine entry point
//!
//! Initializes logging and configuration, opens the file named on the
//! command line into a document and reports its statistics.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use evaedit_core::clock::system_clock;
use evaedit_core::config::EditorConfig;
use evaedit_core::{APP_NAME, VERSION};
use evaedit_editor::Document;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("{} v{} starting...", APP_NAME, VERSION);

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: evaedit <file>");
    };

    let config = load_config();
    let document = Document::open(&path, &config, system_clock())
        .with_context(|| format!("Failed to open {}", path.display()))?;

    info!(
        "Storage:    {}",
        if document.is_paged() { "paged" } else { "piece table" }
    );
    info!("Characters: {}", document.character_count());
    info!("Words:      {}", document.word_count());
    info!("Lines:      {}", document.line_count());
    info!("Paragraphs: {}", document.paragraph_count());

    if document.is_large() {
        warn!("Document exceeds {} characters", config.document.large_document_chars);
    }

    Ok(())
}

/// Load the user configuration, falling back to defaults
fn load_config() -> EditorConfig {
    match EditorConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using default configuration", e.user_message());
            EditorConfig::default()
        }
    }
}
