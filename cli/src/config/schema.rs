//! Configuration schema for artifetch
//!
//! Every field has a serde default so partial files load, and empty sections
//! are skipped on save to keep the file readable.

use super::paths;
use anyhow::Result;
use artifetch_core::repository::DEFAULT_CONTENT_TYPE;
use artifetch_core::{ExclusionPattern, ManagerSettings, RemoteRepository, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const URL_SCHEMES: &[&str] = &["http", "https", "file"];
const PROXY_TYPES: &[&str] = &["http", "https", "socks5"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArtifetchConfig {
    /// Shared artifact cache, `~/.m2/repository` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_repository: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub offline: bool,

    /// Ignore repositories declared inside artifact descriptors
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict_repositories: bool,

    /// Exclusion patterns added to every transitive resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_exclusions: Vec<String>,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RemoteRepository>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrySection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    artifetch_core::retry::DEFAULT_MAX_RETRIES
}

fn default_interval_ms() -> u64 {
    artifetch_core::retry::DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn is_false(value: &bool) -> bool {
    !value
}

impl ArtifetchConfig {
    /// Validate the configuration
    ///
    /// Returns Ok(()) if valid, or Err with every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for repo in &self.repositories {
            if repo.id.trim().is_empty() {
                errors.push(format!("Repository with URL '{}' has an empty id", repo.url));
            } else if !seen.insert(repo.id.as_str()) {
                errors.push(format!("Duplicate repository id '{}'", repo.id));
            }

            match Url::parse(&repo.url) {
                Ok(url) if URL_SCHEMES.contains(&url.scheme()) => {
                    if url.scheme() == "file" && url.to_file_path().is_err() {
                        errors.push(format!(
                            "Repository '{}' has file URL '{}' that is not a local path",
                            repo.id, repo.url
                        ));
                    }
                }
                _ => errors.push(format!(
                    "Repository '{}' has unsupported URL '{}' (expected {})",
                    repo.id,
                    repo.url,
                    URL_SCHEMES.join(", ")
                )),
            }

            if repo.content_type != DEFAULT_CONTENT_TYPE {
                errors.push(format!(
                    "Repository '{}' has unsupported layout '{}' (only '{}' is supported)",
                    repo.id, repo.content_type, DEFAULT_CONTENT_TYPE
                ));
            }

            for policy in [&repo.releases, &repo.snapshots].into_iter().flatten() {
                if let Err(e) = policy.update() {
                    errors.push(format!("Repository '{}' has an {}", repo.id, e));
                }
            }

            if let Some(proxy) = &repo.proxy {
                if !PROXY_TYPES.contains(&proxy.proxy_type.as_str()) {
                    errors.push(format!(
                        "Repository '{}' has unsupported proxy type '{}' (expected {})",
                        repo.id,
                        proxy.proxy_type,
                        PROXY_TYPES.join(", ")
                    ));
                }
                if proxy.host.trim().is_empty() {
                    errors.push(format!("Repository '{}' has an empty proxy host", repo.id));
                }
                if proxy.port == 0 {
                    errors.push(format!("Repository '{}' has proxy port 0", repo.id));
                }
            }
        }

        for pattern in &self.default_exclusions {
            if pattern.trim().is_empty() || pattern.split(':').count() > 2 {
                errors.push(format!(
                    "Invalid default exclusion '{}' (expected artifact or group:artifact)",
                    pattern
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configured repositories, or Maven Central when none are configured
    pub fn effective_repositories(&self) -> Vec<RemoteRepository> {
        if self.repositories.is_empty() {
            vec![RemoteRepository::central()]
        } else {
            self.repositories.clone()
        }
    }

    pub fn local_repository(&self) -> Result<PathBuf> {
        match &self.local_repository {
            Some(path) => super::utils::expand_home(&path.to_string_lossy()),
            None => paths::get_default_local_repository(),
        }
    }

    /// Build manager settings from the file contents
    pub fn manager_settings(&self) -> Result<ManagerSettings> {
        let mut settings = ManagerSettings::new(self.local_repository()?);
        settings.repositories = self.effective_repositories();
        settings.retry = RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_millis(self.retry.interval_ms),
        );
        settings.default_exclusions = self
            .default_exclusions
            .iter()
            .map(ExclusionPattern::new)
            .collect();
        settings.strict_repositories = self.strict_repositories;
        settings.offline = self.offline;
        Ok(settings)
    }
}
