//! The seam to the external repository resolution service
//!
//! Graph resolution (version mediation, conflict resolution, descriptor
//! traversal) happens behind [`RepositoryResolver`]. The orchestrator only
//! builds requests, serializes sessions and interprets results.

use crate::artifact::{Coordinate, ExclusionPattern, ResolvedArtifact};
use crate::error::ResolverError;
use crate::repository::{ChecksumPolicy, RemoteRepository};
use std::fmt;
use std::path::PathBuf;

/// Settings applied to every resolution session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Shared on-disk cache, owned by the resolver
    pub local_repository: PathBuf,
    pub checksum_policy: ChecksumPolicy,
    pub offline: bool,
    /// Ignore repositories declared inside artifact descriptors
    pub ignore_descriptor_repositories: bool,
}

/// Resolve a set of roots together with their dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitiveRequest {
    /// (coordinate, scope) pairs in categorized order
    pub roots: Vec<(Coordinate, String)>,
    pub exclusions: Vec<ExclusionPattern>,
    pub repositories: Vec<RemoteRepository>,
    pub session: SessionSettings,
}

impl TransitiveRequest {
    pub fn is_excluded(&self, coordinate: &Coordinate) -> bool {
        self.exclusions.iter().any(|p| p.matches(coordinate))
    }
}

/// Resolve exactly one coordinate, ignoring its dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleRequest {
    pub coordinate: Coordinate,
    pub scope: String,
    pub repositories: Vec<RemoteRepository>,
    pub session: SessionSettings,
}

/// A failed upload or download observed by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub resource: String,
    pub repository_id: String,
    /// Underlying cause, when the transport reported one
    pub error: Option<String>,
}

impl fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FAILED {} ({})", self.resource, self.repository_id)
    }
}

/// Raw events emitted by a resolver while a session runs
pub trait ResolutionEvents {
    fn transfer_failed(&self, event: &TransferEvent);

    fn artifact_resolved(&self, artifact: &ResolvedArtifact);
}

/// External repository resolution service
///
/// Implementations may block. They are never entered concurrently by one
/// [`crate::DependencyManager`], but must be `Send + Sync` so the manager can
/// be shared between threads.
pub trait RepositoryResolver: Send + Sync {
    /// Resolve the roots and their transitive graph, minus the exclusions
    fn resolve_dependencies(
        &self,
        request: &TransitiveRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<Vec<ResolvedArtifact>, ResolverError>;

    /// Resolve a single coordinate
    fn resolve_artifact(
        &self,
        request: &SingleRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<ResolvedArtifact, ResolverError>;
}
