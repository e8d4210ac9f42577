//! Resolve dependency locators into artifact files
//!
//! A batch of locators (`mvn://group:artifact:version?scope=..&transitive=..&exclude=..`
//! or any other URL) is parsed, categorized, resolved through a pluggable
//! [`RepositoryResolver`] one session at a time with retries, and can then be
//! copied out of the shared cache with a [`Materializer`].

pub mod artifact;
pub mod categorize;
pub mod classify;
pub mod error;
pub mod locator;
pub mod manager;
pub mod materialize;
pub mod notifier;
pub mod repository;
pub mod resolver;
pub mod retry;

pub use artifact::{Coordinate, ExclusionPattern, ResolvedArtifact};
pub use categorize::{CategorizedRequest, ManagedDependency, categorize};
pub use error::{Error, LocatorError, MaterializeError, ResolutionError, ResolverError, Result};
pub use locator::{DependencyLocator, LocatorKind, MAVEN_SCHEME, parse_all};
pub use manager::{DependencyManager, ManagerSettings};
pub use materialize::Materializer;
pub use notifier::{ListenerResult, NoopListener, ProgressEvent, ProgressListener};
pub use repository::{
    ChecksumPolicy, ProxyConfig, RemoteRepository, RepositoryPolicy, UpdatePolicy,
};
pub use resolver::{
    RepositoryResolver, ResolutionEvents, SessionSettings, SingleRequest, TransferEvent,
    TransitiveRequest,
};
pub use retry::RetryPolicy;
