use std::path::PathBuf;
use thiserror::Error;

/// A locator string that cannot be interpreted.
///
/// Rejects the whole batch: there is no skip-and-continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("missing scheme in locator '{locator}'")]
    MissingScheme { locator: String },

    #[error("invalid coordinate '{authority}' in locator '{locator}': {reason}")]
    InvalidCoordinate {
        locator: String,
        authority: String,
        reason: String,
    },

    #[error("query pair '{pair}' in locator '{locator}' has no '='")]
    MissingPairSeparator { locator: String, pair: String },

    #[error("invalid percent-encoding '{fragment}' in locator '{locator}'")]
    InvalidPercentEncoding { locator: String, fragment: String },
}

/// Failures reported by a [`crate::RepositoryResolver`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// A download or repository lookup failed in a way that may succeed later.
    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("artifact {coordinate} not found in {repositories}")]
    ArtifactNotFound {
        coordinate: String,
        repositories: String,
    },

    #[error("invalid artifact descriptor for {coordinate}: {reason}")]
    InvalidDescriptor { coordinate: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl ResolverError {
    /// Whether a retry has any chance of changing the outcome.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolverError::Transfer(_))
    }
}

/// Terminal failure of a resolve call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("{message}")]
    Unresolvable {
        message: String,
        #[source]
        cause: ResolverError,
    },

    #[error("{message} (gave up after {attempts} attempts)")]
    RetriesExhausted {
        message: String,
        attempts: u32,
        #[source]
        cause: ResolverError,
    },
}

impl ResolutionError {
    pub fn cause(&self) -> &ResolverError {
        match self {
            ResolutionError::Unresolvable { cause, .. } => cause,
            ResolutionError::RetriesExhausted { cause, .. } => cause,
        }
    }
}

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for callers driving the whole pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
