//! Artifact coordinates, exclusion patterns and resolved artifacts
//!
//! A coordinate is written `group:artifact:version[:classifier][:type]`.
//! Resolved artifacts are only ever produced by a [`crate::RepositoryResolver`];
//! nothing in this crate fabricates one from a coordinate alone.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Extension used when a coordinate does not name a type.
pub const DEFAULT_EXTENSION: &str = "jar";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub extension: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Parse `group:artifact:version[:classifier][:type]`
    ///
    /// Returns the reason as a plain message; the locator parser wraps it with
    /// the offending locator.
    pub fn parse(authority: &str) -> Result<Self, String> {
        let segments: Vec<&str> = authority.split(':').collect();
        if !(3..=5).contains(&segments.len()) {
            return Err(format!(
                "expected group:artifact:version[:classifier][:type], got {} segment(s)",
                segments.len()
            ));
        }

        for (name, value) in ["group", "artifact", "version"].iter().zip(&segments) {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", name));
            }
        }

        let classifier = segments
            .get(3)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string());

        let extension = match segments.get(4) {
            Some(ext) if ext.is_empty() => return Err("type must not be empty".to_string()),
            Some(ext) => ext.to_string(),
            None => DEFAULT_EXTENSION.to_string(),
        };

        Ok(Self {
            group_id: segments[0].to_string(),
            artifact_id: segments[1].to_string(),
            version: segments[2].to_string(),
            classifier,
            extension,
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }

    /// File name inside the version directory, e.g. `lib-a-1.0.0-sources.jar`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Relative path in the Maven 2 repository layout
    ///
    /// `org.example:lib-a:1.0.0` → `org/example/lib-a/1.0.0/lib-a-1.0.0.jar`
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group_id.split('.').collect();
        path.push(&self.artifact_id);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }

    /// Same as [`Coordinate::repository_path`] but always `/`-separated, for URLs
    pub fn repository_url_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        match (&self.classifier, self.extension.as_str()) {
            (None, DEFAULT_EXTENSION) => Ok(()),
            (None, ext) => write!(f, "::{}", ext),
            (Some(classifier), ext) => write!(f, ":{}:{}", classifier, ext),
        }
    }
}

/// A coordinate pattern removed from a transitive resolution
///
/// `group:artifact` matches on both ids, a single segment matches the artifact
/// id alone. Either segment may use `*` as a wildcard (`org.bad:*`, `*-test`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExclusionPattern(String);

impl ExclusionPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        let mut segments = self.0.split(':');
        match (segments.next(), segments.next()) {
            (Some(artifact), None) => glob_match(artifact, &coordinate.artifact_id),
            (Some(group), Some(artifact)) => {
                glob_match(group, &coordinate.group_id)
                    && glob_match(artifact, &coordinate.artifact_id)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `*` matches any run of characters, everything else is literal
fn glob_match(pattern: &str, text: &str) -> bool {
    let Some((head, rest)) = pattern.split_once('*') else {
        return pattern == text;
    };
    let Some(mut remaining) = text.strip_prefix(head) else {
        return false;
    };

    let mut parts: Vec<&str> = rest.split('*').collect();
    let tail = parts.pop().unwrap_or("");
    for part in parts {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= tail.len() && remaining.ends_with(tail)
}

/// An artifact file produced by the external resolution service
///
/// Equality, ordering and hashing use the coordinate and the path only, so the
/// same file reached under two scopes is reported once.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedArtifact {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub path: PathBuf,
    pub scope: String,
}

impl ResolvedArtifact {
    pub fn new(coordinate: Coordinate, path: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        Self {
            coordinate,
            path: path.into(),
            scope: scope.into(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.coordinate.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.coordinate.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.coordinate.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for ResolvedArtifact {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate && self.path == other.path
    }
}

impl Eq for ResolvedArtifact {}

impl Hash for ResolvedArtifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinate.hash(state);
        self.path.hash(state);
    }
}

impl PartialOrd for ResolvedArtifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResolvedArtifact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coordinate
            .cmp(&other.coordinate)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> {}", self.coordinate, self.scope, self.path.display())
    }
}
