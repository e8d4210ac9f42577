//! Shared fixtures for resolution tests
//!
//! [`ScriptedResolver`] stands in for the external resolution service. It
//! writes a small file into the local repository for every coordinate it
//! resolves, records every request, can fail a configured number of times
//! and tracks how many sessions overlap.

#![allow(dead_code)]

use artifetch_core::{
    ManagerSettings, RepositoryResolver, ResolutionEvents, ResolvedArtifact, ResolverError,
    RetryPolicy, SingleRequest, TransferEvent, TransitiveRequest,
};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Transitive(TransitiveRequest),
    Single(SingleRequest),
}

#[derive(Default)]
pub struct ScriptedResolver {
    pub calls: Mutex<Vec<Call>>,
    transient_failures: AtomicU32,
    session_delay: Duration,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` sessions with a transfer error
    pub fn failing(count: u32) -> Self {
        Self {
            transient_failures: AtomicU32::new(count),
            ..Self::default()
        }
    }

    /// Hold every session open for `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            session_delay: delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, events: &dyn ResolutionEvents) -> Result<SessionGuard<'_>, ResolverError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let guard = SessionGuard(&self.active);

        if !self.session_delay.is_zero() {
            std::thread::sleep(self.session_delay);
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            events.transfer_failed(&TransferEvent {
                resource: "https://repo.example/flaky".into(),
                repository_id: "flaky".into(),
                error: Some("connection reset".into()),
            });
            return Err(ResolverError::Transfer("connection reset".into()));
        }
        Ok(guard)
    }
}

struct SessionGuard<'a>(&'a AtomicUsize);

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn materialize_in_cache(
    local_repository: &Path,
    coordinate: &artifetch_core::Coordinate,
    scope: &str,
) -> Result<ResolvedArtifact, ResolverError> {
    let path = local_repository.join(coordinate.repository_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ResolverError::Other(e.to_string()))?;
    }
    fs::write(&path, format!("content of {coordinate}"))
        .map_err(|e| ResolverError::Other(e.to_string()))?;
    Ok(ResolvedArtifact::new(coordinate.clone(), path, scope))
}

impl RepositoryResolver for ScriptedResolver {
    fn resolve_dependencies(
        &self,
        request: &TransitiveRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<Vec<ResolvedArtifact>, ResolverError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Transitive(request.clone()));
        let _session = self.enter(events)?;

        let mut artifacts = Vec::new();
        for (coordinate, scope) in &request.roots {
            if request.is_excluded(coordinate) {
                continue;
            }
            let artifact =
                materialize_in_cache(&request.session.local_repository, coordinate, scope)?;
            events.artifact_resolved(&artifact);
            artifacts.push(artifact);
        }
        Ok(artifacts)
    }

    fn resolve_artifact(
        &self,
        request: &SingleRequest,
        events: &dyn ResolutionEvents,
    ) -> Result<ResolvedArtifact, ResolverError> {
        self.calls.lock().unwrap().push(Call::Single(request.clone()));
        let _session = self.enter(events)?;

        let artifact = materialize_in_cache(
            &request.session.local_repository,
            &request.coordinate,
            &request.scope,
        )?;
        events.artifact_resolved(&artifact);
        Ok(artifact)
    }
}

/// Settings with no backoff so retry tests run instantly
pub fn settings(local_repository: &Path, max_retries: u32) -> ManagerSettings {
    let mut settings = ManagerSettings::new(local_repository);
    settings.retry = RetryPolicy::new(max_retries, Duration::ZERO);
    settings
}
