//! Configuration file I/O operations
//!
//! This module handles reading, writing, and updating the artifetch
//! configuration file. All operations include automatic validation.

use super::paths::get_config_path;
use super::schema::ArtifetchConfig;
use super::utils::validate_repository_id;
use anyhow::{Context, Result};
use artifetch_core::RemoteRepository;
use std::fs;
use std::path::Path;

/// Load configuration from disk
///
/// Returns a default config if the file doesn't exist.
/// Validates the config after loading.
pub fn load_config() -> Result<ArtifetchConfig> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<ArtifetchConfig> {
    if !path.exists() {
        return Ok(ArtifetchConfig::default());
    }

    let content =
        fs::read_to_string(path).context(format!("Failed to read config: {}", path.display()))?;

    let config: ArtifetchConfig =
        toml::from_str(&content).context(format!("Failed to parse config: {}", path.display()))?;

    if let Err(errors) = config.validate() {
        anyhow::bail!(
            "Config validation failed in {}:\n  {}",
            path.display(),
            errors.join("\n  ")
        );
    }

    Ok(config)
}

/// Save configuration to disk
///
/// Creates parent directories if needed.
/// Validates the config before saving.
pub fn save_config(config: &ArtifetchConfig) -> Result<()> {
    save_config_to(config, &get_config_path()?)
}

pub fn save_config_to(config: &ArtifetchConfig, path: &Path) -> Result<()> {
    if let Err(errors) = config.validate() {
        anyhow::bail!("cannot save invalid config:\n  {}", errors.join("\n  "));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(format!(
            "Failed to create config directory: {}",
            parent.display()
        ))?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, content).context(format!("Failed to write config: {}", path.display()))?;

    Ok(())
}

/// Update config with a modification function
///
/// This handles the load → modify → validate → save cycle.
pub fn update_config<F>(f: F) -> Result<()>
where
    F: FnOnce(&mut ArtifetchConfig) -> Result<()>,
{
    let mut config = load_config()?;
    f(&mut config)?;
    save_config(&config)?;
    Ok(())
}

/// Add a repository, or replace the one with the same id
///
/// Returns true if an existing definition was replaced.
pub fn add_repository(repository: RemoteRepository) -> Result<bool> {
    validate_repository_id(&repository.id)?;

    let mut replaced = false;
    update_config(|config| {
        replaced = upsert_repository(config, repository);
        Ok(())
    })?;
    Ok(replaced)
}

/// Remove a repository by id
///
/// Returns an error if the id doesn't exist.
pub fn remove_repository(id: &str) -> Result<()> {
    update_config(|config| {
        let before = config.repositories.len();
        config.repositories.retain(|r| r.id != id);
        if config.repositories.len() == before {
            anyhow::bail!("repository '{}' not found", id);
        }
        Ok(())
    })
}

fn upsert_repository(config: &mut ArtifetchConfig, repository: RemoteRepository) -> bool {
    match config
        .repositories
        .iter_mut()
        .find(|r| r.id == repository.id)
    {
        Some(existing) => {
            *existing = repository;
            true
        }
        None => {
            config.repositories.push(repository);
            false
        }
    }
}
