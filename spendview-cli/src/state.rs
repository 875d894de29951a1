use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn spendview_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendview"))
}

pub fn ensure_spendview_home() -> Result<PathBuf> {
    let dir = spendview_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where `dashboard` mode sends its logs
pub fn log_path() -> Result<PathBuf> {
    Ok(ensure_spendview_home()?.join("spendview.log"))
}
