//! Directory path management for artifetch
//!
//! All paths used by artifetch are centralized here.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the base artifetch directory (~/.config/artifetch/)
pub fn get_artifetch_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to get config directory")?
        .join("artifetch"))
}

/// Get the config file path (~/.config/artifetch/config.toml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_artifetch_dir()?.join("config.toml"))
}

/// Get the log directory (~/.local/share/artifetch/logs/ on Linux)
pub fn get_log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("Failed to determine data directory (XDG_DATA_HOME or platform equivalent)")?;

    Ok(data_dir.join("artifetch").join("logs"))
}

/// Get the default shared artifact cache (~/.m2/repository)
///
/// Shared with Maven and other tools using the same layout.
pub fn get_default_local_repository() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to get home directory")?
        .join(".m2")
        .join("repository"))
}
