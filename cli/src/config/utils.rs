//! Helpers shared by the config and command modules

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Expand a leading `~/` to the home directory
///
/// Unlike canonicalization the path does not have to exist yet, since cache
/// and output directories are created on demand.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(stripped) => Ok(dirs::home_dir()
            .context("cannot determine home directory")?
            .join(stripped)),
        None if path == "~" => dirs::home_dir().context("cannot determine home directory"),
        None => Ok(PathBuf::from(path)),
    }
}

/// Validate a repository id
///
/// Ids must be non-empty and contain only alphanumeric characters, hyphens,
/// underscores or dots.
pub fn validate_repository_id(id: &str) -> Result<()> {
    if id.is_empty() {
        anyhow::bail!("repository id cannot be empty");
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        anyhow::bail!(
            "repository id '{}' must contain only alphanumeric characters, hyphens, underscores, or dots",
            id
        );
    }

    Ok(())
}
