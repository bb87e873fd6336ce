use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::state::log_path;

const DEFAULT_FILTER: &str = "palm=info";

/// Send tracing output to `~/.palm-insight/palm.log`; the terminal belongs to the quiz.
/// `PALM_LOG` takes an env-filter directive, e.g. `PALM_LOG=palm_oracle=debug`.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env("PALM_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init logging: {e}"))?;

    Ok(path)
}
