//! JSON record of a download run

use anyhow::{Context, Result};
use artifetch_core::{Coordinate, ResolvedArtifact};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub output: PathBuf,
    pub artifacts: Vec<ManifestEntry>,
    /// Non-managed locators, passed through untouched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub direct_links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub scope: String,
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Manifest {
    pub fn new(output: &Path) -> Self {
        Self {
            generated_at: Utc::now(),
            output: output.to_path_buf(),
            artifacts: Vec::new(),
            direct_links: Vec::new(),
        }
    }

    pub fn record(&mut self, artifact: &ResolvedArtifact, target: &Path) {
        self.artifacts.push(ManifestEntry {
            coordinate: artifact.coordinate.clone(),
            scope: artifact.scope.clone(),
            source: artifact.path.clone(),
            target: target.to_path_buf(),
        });
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        fs::write(path, content).context(format!("Failed to write manifest: {}", path.display()))
    }
}
