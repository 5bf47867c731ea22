//! SQL Index Manager options entry point.
//!
//! Resolves the effective maintenance options and prints them as JSON on
//! stdout:
//! - Loads `IDXMGR_OPTIONS_FILE` if set, otherwise starts from defaults
//! - Applies `IDXMGR_*` environment overrides on top

use anyhow::{Context, Result};
use sql_index_manager::constants::ENV_OPTIONS_FILE;
use sql_index_manager::Options;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // stdout carries the resolved options
    init_logging();

    // paths need not be UTF-8
    let mut options = match std::env::var_os(ENV_OPTIONS_FILE) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "Loading options file");
            Options::load(&path)
                .with_context(|| format!("failed to load options from {}", path.display()))?
        }
        None => Options::default(),
    };

    options
        .apply_env()
        .context("failed to apply environment overrides")?;

    println!("{}", options.to_json_pretty()?);
    Ok(())
}

/// Initialize tracing subscriber with stderr output.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,sql_index_manager=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
