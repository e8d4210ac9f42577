//! Maven 2 layout resolver used by the CLI
//!
//! Resolves each requested coordinate from the local repository, or downloads
//! it from the first configured remote repository that has it. This resolver
//! does not read artifact descriptors: a transitive request resolves its roots
//! (minus exclusions) and nothing else. A full graph resolver can be plugged
//! in behind the same [`RepositoryResolver`] trait.
//!
//! Cached releases are used as is. A cached `-SNAPSHOT` is fetched again when
//! the snapshot `update_policy` of a candidate repository says it is due, and
//! kept if that refresh fails.
//!
//! Checksums are not fetched, which matches the `Ignore` policy every session
//! carries.

mod transport;

pub use transport::{FetchError, Transport};

use artifetch_core::{
    Coordinate, RemoteRepository, RepositoryResolver, ResolutionEvents, ResolvedArtifact,
    ResolverError, SessionSettings, SingleRequest, TransferEvent, TransitiveRequest,
};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};

#[derive(Default)]
pub struct Maven2Resolver {
    transport: Transport,
}

impl Maven2Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all, fields(artifact = %coordinate))]
    fn resolve_one(
        &self,
        coordinate: &Coordinate,
        scope: &str,
        repositories: &[RemoteRepository],
        session: &SessionSettings,
        events: &dyn ResolutionEvents,
    ) -> Result<ResolvedArtifact, ResolverError> {
        let target = session
            .local_repository
            .join(coordinate.repository_path());

        let snapshot = coordinate.is_snapshot();
        let candidates: Vec<&RemoteRepository> = repositories
            .iter()
            .filter(|r| r.accepts(snapshot))
            .collect();

        let cached = target.is_file();
        if cached && (session.offline || !needs_update(&target, snapshot, &candidates)) {
            debug!(path = %target.display(), "found in local repository");
            let artifact = ResolvedArtifact::new(coordinate.clone(), target, scope);
            events.artifact_resolved(&artifact);
            return Ok(artifact);
        }

        if session.offline {
            return Err(ResolverError::ArtifactNotFound {
                coordinate: coordinate.to_string(),
                repositories: "offline".to_string(),
            });
        }

        if cached {
            debug!(path = %target.display(), "cached snapshot is due for an update");
        }

        let url_path = coordinate.repository_url_path();
        let mut transient = None;

        for repository in &candidates {
            match self.transport.fetch(repository, &url_path, &target) {
                Ok(()) => {
                    info!(repository = %repository.id, "downloaded {}", coordinate);
                    let artifact = ResolvedArtifact::new(coordinate.clone(), target.clone(), scope);
                    events.artifact_resolved(&artifact);
                    return Ok(artifact);
                }
                Err(e) => {
                    events.transfer_failed(&TransferEvent {
                        resource: Transport::resource_url(repository, &url_path),
                        repository_id: repository.id.clone(),
                        error: Some(e.to_string()),
                    });
                    if e.is_transient() {
                        transient = Some(format!("{} ({})", e, repository.id));
                    }
                }
            }
        }

        if cached {
            warn!("could not refresh {}, using the cached copy", coordinate);
            let artifact = ResolvedArtifact::new(coordinate.clone(), target, scope);
            events.artifact_resolved(&artifact);
            return Ok(artifact);
        }

        match transient {
            Some(message) => Err(ResolverError::Transfer(message)),
            None => Err(ResolverError::ArtifactNotFound {
                coordinate: coordinate.to_string(),
                repositories: describe(&candidates),
            }),
        }
    }
}

/// Whether a cached copy at `target` should be fetched again
///
/// The most eager policy among the candidate repositories wins.
fn needs_update(target: &Path, snapshot: bool, repositories: &[&RemoteRepository]) -> bool {
    let Ok(modified) = fs::metadata(target).and_then(|m| m.modified()) else {
        return true;
    };
    let now = SystemTime::now();
    repositories
        .iter()
        .any(|r| r.update_policy(snapshot).is_stale(modified, now))
}

fn describe(repositories: &[&RemoteRepository]) -> String {
    if repositories.is_empty() {
        return "no enabled repository".to_string();
    }
    repositories
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RepositoryResolver for Maven2Resolver {
    fn resolve_dependencies(
        &self,
        request: &TransitiveRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<Vec<ResolvedArtifact>, ResolverError> {
        let mut artifacts = Vec::with_capacity(request.roots.len());
        for (coordinate, scope) in &request.roots {
            if request.is_excluded(coordinate) {
                debug!(artifact = %coordinate, "excluded");
                continue;
            }
            artifacts.push(self.resolve_one(
                coordinate,
                scope,
                &request.repositories,
                &request.session,
                events,
            )?);
        }
        Ok(artifacts)
    }

    fn resolve_artifact(
        &self,
        request: &SingleRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<ResolvedArtifact, ResolverError> {
        self.resolve_one(
            &request.coordinate,
            &request.scope,
            &request.repositories,
            &request.session,
            events,
        )
    }
}
