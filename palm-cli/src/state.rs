use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `~/.palm-insight`, or `$PALM_HOME` when set.
pub fn palm_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PALM_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".palm-insight"))
}

pub fn ensure_palm_home() -> Result<PathBuf> {
    let dir = palm_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_path() -> Result<PathBuf> {
    Ok(ensure_palm_home()?.join("palm.log"))
}
