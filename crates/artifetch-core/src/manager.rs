//! Resolution orchestration
//!
//! [`DependencyManager`] turns a locator batch into at most one transitive
//! request plus one single request per non-transitive locator, runs them
//! against the external [`RepositoryResolver`] one session at a time, retries
//! transient failures and merges everything into one deduplicated set.
//!
//! ## Serialization
//!
//! The resolver's on-disk cache is not safe for concurrent mutation, so every
//! session attempt of one manager runs under the same lock. Concurrent callers
//! of [`DependencyManager::resolve`] queue up; the backoff sleep between retry
//! attempts happens outside the lock. Callers that need parallel throughput
//! use separate managers against separate caches.
//!
//! ## Checksums
//!
//! Every request asks the resolver to ignore checksum mismatches.

use crate::artifact::{ExclusionPattern, ResolvedArtifact};
use crate::categorize::{CategorizedRequest, ManagedDependency, categorize};
use crate::classify::{RequestContext, describe_failure};
use crate::error::{ResolutionError, ResolverError};
use crate::locator::DependencyLocator;
use crate::notifier::{ProgressListener, ProgressNotifier};
use crate::repository::{ChecksumPolicy, RemoteRepository};
use crate::resolver::{RepositoryResolver, SessionSettings, SingleRequest, TransitiveRequest};
use crate::retry::{RetryFailure, RetryPolicy};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Everything a manager needs besides the resolver itself
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub repositories: Vec<RemoteRepository>,
    pub local_repository: PathBuf,
    pub retry: RetryPolicy,
    /// Appended to every batch's exclusion union
    pub default_exclusions: Vec<ExclusionPattern>,
    pub strict_repositories: bool,
    pub offline: bool,
}

impl ManagerSettings {
    pub fn new(local_repository: impl Into<PathBuf>) -> Self {
        Self {
            repositories: vec![RemoteRepository::central()],
            local_repository: local_repository.into(),
            retry: RetryPolicy::default(),
            default_exclusions: Vec::new(),
            strict_repositories: false,
            offline: false,
        }
    }
}

pub struct DependencyManager {
    resolver: Arc<dyn RepositoryResolver>,
    settings: ManagerSettings,
    session_lock: Mutex<()>,
}

impl DependencyManager {
    pub fn new(resolver: Arc<dyn RepositoryResolver>, settings: ManagerSettings) -> Self {
        Self {
            resolver,
            settings,
            session_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub fn local_repository(&self) -> &Path {
        &self.settings.local_repository
    }

    /// Categorize a batch the way [`DependencyManager::resolve`] would
    pub fn categorize(&self, locators: &[DependencyLocator]) -> CategorizedRequest {
        categorize(locators.iter().cloned()).with_additional_exclusions(
            self.settings.default_exclusions.iter().cloned(),
        )
    }

    /// Resolve a batch of locators
    ///
    /// Direct links are not resolved. An empty batch returns immediately
    /// without touching the resolver or the listener.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] for the first request that cannot be
    /// resolved or that keeps failing after all retries.
    pub fn resolve(
        &self,
        locators: &[DependencyLocator],
        listener: &dyn ProgressListener,
    ) -> Result<BTreeSet<ResolvedArtifact>, ResolutionError> {
        let mut result = BTreeSet::new();
        if locators.is_empty() {
            return Ok(result);
        }

        let request = self.categorize(locators);
        for link in request.direct_links() {
            debug!(locator = %link, "direct link, not resolved");
        }
        if !request.has_managed() {
            return Ok(result);
        }

        let notifier = ProgressNotifier::new(listener);

        if !request.transitive().is_empty() {
            result.extend(self.resolve_transitive(&request, &notifier)?);
        }

        for dependency in request.single() {
            result.insert(self.resolve_single(dependency, &notifier)?);
        }

        info!(
            transitive = request.transitive().len(),
            single = request.single().len(),
            artifacts = result.len(),
            "resolution finished"
        );

        Ok(result)
    }

    fn resolve_transitive(
        &self,
        request: &CategorizedRequest,
        notifier: &ProgressNotifier<'_>,
    ) -> Result<Vec<ResolvedArtifact>, ResolutionError> {
        let transitive = TransitiveRequest {
            roots: request
                .transitive()
                .iter()
                .map(|d| (d.coordinate.clone(), d.scope.clone()))
                .collect(),
            exclusions: request.exclusions().to_vec(),
            repositories: self.settings.repositories.clone(),
            session: self.session_settings(),
        };
        let context = RequestContext::Transitive(request.transitive());

        debug!(
            roots = transitive.roots.len(),
            exclusions = transitive.exclusions.len(),
            "collecting transitive dependencies"
        );

        self.with_retry(&context, notifier, || {
            let _session = self.lock_session();
            self.resolver.resolve_dependencies(&transitive, notifier)
        })
    }

    fn resolve_single(
        &self,
        dependency: &ManagedDependency,
        notifier: &ProgressNotifier<'_>,
    ) -> Result<ResolvedArtifact, ResolutionError> {
        let single = SingleRequest {
            coordinate: dependency.coordinate.clone(),
            scope: dependency.scope.clone(),
            repositories: self.settings.repositories.clone(),
            session: self.session_settings(),
        };
        let context = RequestContext::Single(dependency);

        debug!(artifact = %single.coordinate, "resolving single artifact");

        self.with_retry(&context, notifier, || {
            let _session = self.lock_session();
            self.resolver.resolve_artifact(&single, notifier)
        })
    }

    fn with_retry<T, F>(
        &self,
        context: &RequestContext<'_>,
        notifier: &ProgressNotifier<'_>,
        op: F,
    ) -> Result<T, ResolutionError>
    where
        F: FnMut() -> Result<T, ResolverError>,
    {
        self.settings
            .retry
            .run(op, |retry| notifier.retry_occurred(retry, context))
            .map_err(|failure| match failure {
                RetryFailure::Permanent { error, .. } => ResolutionError::Unresolvable {
                    message: describe_failure(context, &error),
                    cause: error,
                },
                RetryFailure::Exhausted { attempts, error } => {
                    ResolutionError::RetriesExhausted {
                        message: describe_failure(context, &error),
                        attempts,
                        cause: error,
                    }
                }
            })
    }

    fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            local_repository: self.settings.local_repository.clone(),
            checksum_policy: ChecksumPolicy::Ignore,
            offline: self.settings.offline,
            ignore_descriptor_repositories: self.settings.strict_repositories,
        }
    }

    /// The guarded value is `()`, a poisoned lock has nothing to repair
    fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.session_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Coordinate;
    use crate::locator::parse_all;
    use crate::notifier::NoopListener;
    use crate::resolver::ResolutionEvents;

    /// Resolves every coordinate to its layout path, recording requests
    #[derive(Default)]
    struct LayoutResolver {
        transitive: Mutex<Vec<TransitiveRequest>>,
        single: Mutex<Vec<SingleRequest>>,
    }

    impl RepositoryResolver for LayoutResolver {
        fn resolve_dependencies(
            &self,
            request: &TransitiveRequest,
            events: &dyn ResolutionEvents,
        ) -> Result<Vec<ResolvedArtifact>, ResolverError> {
            self.transitive.lock().unwrap().push(request.clone());
            let artifacts: Vec<_> = request
                .roots
                .iter()
                .map(|(c, scope)| {
                    let path = request.session.local_repository.join(c.repository_path());
                    ResolvedArtifact::new(c.clone(), path, scope.as_str())
                })
                .collect();
            artifacts.iter().for_each(|a| events.artifact_resolved(a));
            Ok(artifacts)
        }

        fn resolve_artifact(
            &self,
            request: &SingleRequest,
            events: &dyn ResolutionEvents,
        ) -> Result<ResolvedArtifact, ResolverError> {
            self.single.lock().unwrap().push(request.clone());
            let path = request
                .session
                .local_repository
                .join(request.coordinate.repository_path());
            let artifact = ResolvedArtifact::new(request.coordinate.clone(), path, &*request.scope);
            events.artifact_resolved(&artifact);
            Ok(artifact)
        }
    }

    fn manager(resolver: Arc<LayoutResolver>) -> DependencyManager {
        let mut settings = ManagerSettings::new("/cache");
        settings.retry = RetryPolicy::new(0, std::time::Duration::ZERO);
        settings.default_exclusions = vec![ExclusionPattern::new("junit:junit")];
        DependencyManager::new(resolver, settings)
    }

    #[test]
    fn test_session_settings_ignore_checksums() {
        let resolver = Arc::new(LayoutResolver::default());
        let manager = manager(resolver.clone());
        let locators = parse_all(["mvn://g:a:1", "mvn://g:b:1?transitive=false"]).unwrap();

        manager.resolve(&locators, &NoopListener).unwrap();

        let transitive = resolver.transitive.lock().unwrap();
        let single = resolver.single.lock().unwrap();
        assert_eq!(transitive.len(), 1);
        assert_eq!(single.len(), 1);
        assert_eq!(transitive[0].session.checksum_policy, ChecksumPolicy::Ignore);
        assert_eq!(single[0].session.checksum_policy, ChecksumPolicy::Ignore);
        assert_eq!(transitive[0].session.local_repository, PathBuf::from("/cache"));
    }

    #[test]
    fn test_default_exclusions_follow_batch_exclusions() {
        let resolver = Arc::new(LayoutResolver::default());
        let manager = manager(resolver.clone());
        let locators = parse_all(["mvn://g:a:1?exclude=org.bad:evil"]).unwrap();

        manager.resolve(&locators, &NoopListener).unwrap();

        let transitive = resolver.transitive.lock().unwrap();
        let exclusions: Vec<_> = transitive[0].exclusions.iter().map(|p| p.as_str()).collect();
        assert_eq!(exclusions, vec!["org.bad:evil", "junit:junit"]);
    }

    #[test]
    fn test_direct_links_only_makes_no_calls() {
        let resolver = Arc::new(LayoutResolver::default());
        let manager = manager(resolver.clone());
        let locators = parse_all(["https://example.com/x.jar"]).unwrap();

        let result = manager.resolve(&locators, &NoopListener).unwrap();

        assert!(result.is_empty());
        assert!(resolver.transitive.lock().unwrap().is_empty());
        assert!(resolver.single.lock().unwrap().is_empty());
    }

    #[test]
    fn test_results_are_merged_and_deduplicated() {
        let resolver = Arc::new(LayoutResolver::default());
        let manager = manager(resolver);
        // Same coordinate reached transitively and as a single artifact
        let locators = parse_all([
            "mvn://g:a:1",
            "mvn://g:a:1?transitive=false&scope=runtime",
            "mvn://g:b:1",
        ])
        .unwrap();

        let result = manager.resolve(&locators, &NoopListener).unwrap();

        let coordinates: Vec<_> = result.iter().map(|a| a.coordinate.clone()).collect();
        assert_eq!(
            coordinates,
            vec![Coordinate::new("g", "a", "1"), Coordinate::new("g", "b", "1")]
        );
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let resolver = Arc::new(LayoutResolver::default());
        let manager = Arc::new(manager(resolver));

        let poisoner = manager.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock_session();
            panic!("poison the session lock");
        })
        .join();

        let locators = parse_all(["mvn://g:a:1"]).unwrap();
        assert_eq!(manager.resolve(&locators, &NoopListener).unwrap().len(), 1);
    }
}
