//! Copy resolved artifacts out of the shared cache
//!
//! Files land under the target root at the same relative path they have in
//! the local repository, so the output mirrors the cache's
//! `group/artifact/version` layout. Existing files are overwritten.

use crate::artifact::ResolvedArtifact;
use crate::error::MaterializeError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Materializer {
    repository_root: PathBuf,
}

impl Materializer {
    pub fn new(repository_root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: repository_root.into(),
        }
    }

    pub fn repository_root(&self) -> &Path {
        &self.repository_root
    }

    /// Path of the artifact relative to the repository root
    ///
    /// Artifacts outside the root fall back to the standard layout of their
    /// coordinate.
    pub fn relative_path(&self, artifact: &ResolvedArtifact) -> PathBuf {
        match artifact.path.strip_prefix(&self.repository_root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => artifact.coordinate.repository_path(),
        }
    }

    /// Copy one artifact below `target_root`, returning the written path
    pub fn save(
        &self,
        artifact: &ResolvedArtifact,
        target_root: &Path,
    ) -> Result<PathBuf, MaterializeError> {
        let target = target_root.join(self.relative_path(artifact));

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| MaterializeError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::copy(&artifact.path, &target).map_err(|source| MaterializeError::Copy {
            from: artifact.path.clone(),
            to: target.clone(),
            source,
        })?;

        debug!(artifact = %artifact.coordinate, target = %target.display(), "materialized");
        Ok(target)
    }

    /// Copy every artifact in order, stopping at the first failure
    pub fn save_all<'a, I>(
        &self,
        artifacts: I,
        target_root: &Path,
    ) -> Result<Vec<PathBuf>, MaterializeError>
    where
        I: IntoIterator<Item = &'a ResolvedArtifact>,
    {
        artifacts
            .into_iter()
            .map(|artifact| self.save(artifact, target_root))
            .collect()
    }
}
