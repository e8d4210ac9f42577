//! Remote repository definitions handed to the external resolver
//!
//! These mirror the configuration surface of a Maven-style repository system:
//! an id, a URL, a layout (content type), separate release and snapshot
//! policies, optional credentials and an optional proxy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

pub const DEFAULT_CONTENT_TYPE: &str = "default";

pub const CENTRAL_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    Fail,
    #[default]
    Warn,
    Ignore,
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumPolicy::Fail => write!(f, "fail"),
            ChecksumPolicy::Warn => write!(f, "warn"),
            ChecksumPolicy::Ignore => write!(f, "ignore"),
        }
    }
}

/// How often a cached snapshot is checked against its repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    Always,
    #[default]
    Daily,
    Never,
    /// Minutes between checks
    Interval(u64),
}

impl UpdatePolicy {
    /// Whether a copy last written at `modified` should be fetched again
    pub fn is_stale(&self, modified: SystemTime, now: SystemTime) -> bool {
        let max_age = match self {
            UpdatePolicy::Always => return true,
            UpdatePolicy::Never => return false,
            UpdatePolicy::Daily => Duration::from_secs(24 * 60 * 60),
            UpdatePolicy::Interval(minutes) => Duration::from_secs(minutes.saturating_mul(60)),
        };
        now.duration_since(modified).is_ok_and(|age| age >= max_age)
    }
}

impl FromStr for UpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(UpdatePolicy::Always),
            "daily" => Ok(UpdatePolicy::Daily),
            "never" => Ok(UpdatePolicy::Never),
            other => other
                .strip_prefix("interval:")
                .and_then(|minutes| minutes.parse().ok())
                .map(UpdatePolicy::Interval)
                .ok_or_else(|| {
                    format!(
                        "invalid update policy '{}' (expected always, daily, never or interval:<minutes>)",
                        other
                    )
                }),
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePolicy::Always => write!(f, "always"),
            UpdatePolicy::Daily => write!(f, "daily"),
            UpdatePolicy::Never => write!(f, "never"),
            UpdatePolicy::Interval(minutes) => write!(f, "interval:{}", minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `always`, `daily`, `never` or `interval:<minutes>`
    #[serde(default = "default_update_policy")]
    pub update_policy: String,
}

impl RepositoryPolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            update_policy: default_update_policy(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }

    pub fn update(&self) -> Result<UpdatePolicy, String> {
        self.update_policy.parse()
    }
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self::enabled()
    }
}

fn default_true() -> bool {
    true
}

fn default_update_policy() -> String {
    UpdatePolicy::default().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// `http`, `https` or `socks5`
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<RepositoryPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<RepositoryPolicy>,

    /// Free-form credentials, e.g. `username` / `password`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auth: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            content_type: default_content_type(),
            releases: None,
            snapshots: None,
            auth: BTreeMap::new(),
            proxy: None,
        }
    }

    pub fn central() -> Self {
        Self::new(CENTRAL_ID, CENTRAL_URL)
    }

    /// Whether this repository may serve the given version
    ///
    /// An absent policy means enabled.
    pub fn accepts(&self, snapshot: bool) -> bool {
        let policy = if snapshot {
            &self.snapshots
        } else {
            &self.releases
        };
        policy.as_ref().is_none_or(|p| p.enabled)
    }

    /// Update policy for cached copies of the given kind of version
    ///
    /// Releases never change once published, so only snapshots consult the
    /// configured policy. An unparsable policy falls back to `daily`.
    pub fn update_policy(&self, snapshot: bool) -> UpdatePolicy {
        if !snapshot {
            return UpdatePolicy::Never;
        }
        self.snapshots
            .as_ref()
            .and_then(|p| p.update().ok())
            .unwrap_or_default()
    }

    /// Base URL guaranteed to end with `/`
    pub fn base_url(&self) -> String {
        if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        }
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.id, self.url, self.content_type)
    }
}
