//! End-to-end behavior of the resolution pipeline against a scripted resolver

mod common;

use artifetch_core::{
    Coordinate, DependencyManager, ListenerResult, Materializer, NoopListener, ProgressListener,
    ResolutionError, ResolvedArtifact, parse_all,
};
use common::{Call, ScriptedResolver, settings};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    retries: Mutex<Vec<(u32, u32, String)>>,
    transfers: Mutex<Vec<String>>,
    resolved: Mutex<Vec<String>>,
}

impl ProgressListener for Recorder {
    fn on_retry(
        &self,
        try_count: u32,
        max_retries: u32,
        _interval: Duration,
        cause: &str,
    ) -> ListenerResult {
        self.retries
            .lock()
            .unwrap()
            .push((try_count, max_retries, cause.to_string()));
        Ok(())
    }

    fn on_transfer_failed(&self, description: &str) -> ListenerResult {
        self.transfers.lock().unwrap().push(description.to_string());
        Ok(())
    }

    fn on_dependency_resolved(&self, artifact: &ResolvedArtifact) -> ListenerResult {
        self.resolved
            .lock()
            .unwrap()
            .push(artifact.coordinate.to_string());
        Ok(())
    }
}

fn setup(resolver: ScriptedResolver, max_retries: u32) -> (Arc<ScriptedResolver>, DependencyManager, TempDir) {
    let repo = TempDir::new().unwrap();
    let resolver = Arc::new(resolver);
    let manager = DependencyManager::new(resolver.clone(), settings(repo.path(), max_retries));
    (resolver, manager, repo)
}

#[test]
fn test_empty_batch_makes_no_calls() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::new(), 3);
    let recorder = Recorder::default();

    let result = manager.resolve(&[], &recorder).unwrap();

    assert!(result.is_empty());
    assert!(resolver.calls().is_empty());
    assert!(recorder.resolved.lock().unwrap().is_empty());
    assert!(recorder.retries.lock().unwrap().is_empty());
}

#[test]
fn test_transitive_compile_dependency() {
    let (resolver, manager, repo) = setup(ScriptedResolver::new(), 3);
    let recorder = Recorder::default();
    let locators = parse_all(["mvn://org.example:lib-a:1.0.0"]).unwrap();

    let result = manager.resolve(&locators, &recorder).unwrap();

    assert_eq!(result.len(), 1);
    let artifact = result.iter().next().unwrap();
    assert_eq!(artifact.group_id(), "org.example");
    assert_eq!(artifact.artifact_id(), "lib-a");
    assert_eq!(artifact.version(), "1.0.0");
    assert_eq!(artifact.scope, "compile");
    assert!(artifact.path().starts_with(repo.path()));

    let calls = resolver.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::Transitive(req) if req.roots.len() == 1));
    assert_eq!(*recorder.resolved.lock().unwrap(), vec!["org.example:lib-a:1.0.0"]);
}

#[test]
fn test_non_transitive_dependency_uses_single_request() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::new(), 3);
    let locators = parse_all(["mvn://org.example:lib-b:2.0?transitive=false&scope=test"]).unwrap();

    let result = manager.resolve(&locators, &NoopListener).unwrap();

    let calls = resolver.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Single(req) => {
            assert_eq!(req.coordinate, Coordinate::new("org.example", "lib-b", "2.0"));
            assert_eq!(req.scope, "test");
        }
        other => panic!("expected a single request, got {other:?}"),
    }
    assert_eq!(result.iter().next().unwrap().scope, "test");
}

#[test]
fn test_lenient_transitive_flag() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::new(), 0);
    let locators = parse_all([
        "mvn://g:upper:1?transitive=TRUE",
        "mvn://g:no:1?transitive=no",
        "mvn://g:zero:1?transitive=0",
        "mvn://g:caps:1?transitive=FALSE",
    ])
    .unwrap();

    manager.resolve(&locators, &NoopListener).unwrap();

    let calls = resolver.calls();
    let transitive: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Transitive(req) => Some(req.roots.len()),
            Call::Single(_) => None,
        })
        .collect();
    let singles = calls.iter().filter(|c| matches!(c, Call::Single(_))).count();
    assert_eq!(transitive, vec![1]);
    assert_eq!(singles, 3);
}

#[test]
fn test_exclusions_apply_to_whole_batch() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::new(), 0);
    let locators = parse_all([
        "mvn://org.example:lib-c:1.0?exclude=org.bad:evil",
        "mvn://org.example:lib-d:1.0",
        "mvn://org.bad:evil:6.6.6",
    ])
    .unwrap();

    let result = manager.resolve(&locators, &NoopListener).unwrap();

    let calls = resolver.calls();
    assert_eq!(calls.len(), 1);
    let Call::Transitive(request) = &calls[0] else {
        panic!("expected a transitive request");
    };
    assert_eq!(request.roots.len(), 3);
    let patterns: Vec<_> = request.exclusions.iter().map(|p| p.as_str()).collect();
    assert_eq!(patterns, vec!["org.bad:evil"]);

    // The scripted resolver honors exclusions, so evil never comes back
    let ids: Vec<_> = result.iter().map(|a| a.artifact_id()).collect();
    assert_eq!(ids, vec!["lib-c", "lib-d"]);
}

#[test]
fn test_result_is_invariant_under_permutation() {
    let batch = [
        "mvn://org.example:lib-a:1.0.0",
        "mvn://org.example:lib-b:2.0?transitive=false&scope=test",
        "https://example.com/direct.jar",
        "mvn://org.example:lib-c:1.0?exclude=org.bad:evil",
    ];
    let mut reversed = batch;
    reversed.reverse();
    let rotated = [batch[2], batch[3], batch[0], batch[1]];

    let resolve = |order: [&str; 4]| {
        let (resolver, manager, repo) = setup(ScriptedResolver::new(), 0);
        let result = manager
            .resolve(&parse_all(order).unwrap(), &NoopListener)
            .unwrap();
        let relative: Vec<_> = result
            .iter()
            .map(|a| {
                (
                    a.coordinate.clone(),
                    a.path().strip_prefix(repo.path()).unwrap().to_path_buf(),
                )
            })
            .collect();
        let calls: Vec<_> = resolver
            .calls()
            .into_iter()
            .map(|c| match c {
                Call::Transitive(req) => format!("transitive {:?}", req.roots),
                Call::Single(req) => format!("single {}", req.coordinate),
            })
            .collect();
        (relative, calls)
    };

    let expected = resolve(batch);
    assert_eq!(resolve(reversed), expected);
    assert_eq!(resolve(rotated), expected);
}

#[test]
fn test_transient_failures_are_retried() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::failing(2), 3);
    let recorder = Recorder::default();
    let locators = parse_all(["mvn://org.example:lib-a:1.0.0"]).unwrap();

    let result = manager.resolve(&locators, &recorder).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(resolver.calls().len(), 3);

    let retries = recorder.retries.lock().unwrap();
    assert_eq!(retries.len(), 2);
    assert_eq!((retries[0].0, retries[0].1), (1, 3));
    assert_eq!((retries[1].0, retries[1].1), (2, 3));
    assert!(retries[0].2.contains("mvn://org.example:lib-a:1.0.0"));

    let transfers = recorder.transfers.lock().unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(
        transfers[0],
        "FAILED https://repo.example/flaky (flaky), error: connection reset"
    );
}

#[test]
fn test_exhausted_retries_fail_the_batch() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::failing(10), 2);
    let recorder = Recorder::default();
    let locators = parse_all(["mvn://org.example:lib-b:2.0?transitive=false"]).unwrap();

    let err = manager.resolve(&locators, &recorder).unwrap_err();

    match err {
        ResolutionError::RetriesExhausted {
            message, attempts, ..
        } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("mvn://org.example:lib-b:2.0?transitive=false"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(resolver.calls().len(), 3);
    assert_eq!(recorder.retries.lock().unwrap().len(), 2);
}

#[test]
fn test_concurrent_resolves_never_overlap() {
    let repo = TempDir::new().unwrap();
    let resolver = Arc::new(ScriptedResolver::slow(Duration::from_millis(20)));
    let manager = Arc::new(DependencyManager::new(
        resolver.clone(),
        settings(repo.path(), 0),
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                let locators = parse_all([
                    format!("mvn://org.example:lib-{i}:1.0"),
                    format!("mvn://org.example:single-{i}:1.0?transitive=false"),
                ])
                .unwrap();
                manager.resolve(&locators, &NoopListener).unwrap().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
    assert_eq!(resolver.calls().len(), 8);
    assert_eq!(
        resolver.max_active.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

struct Panicking;

impl ProgressListener for Panicking {
    fn on_dependency_resolved(&self, _artifact: &ResolvedArtifact) -> ListenerResult {
        panic!("listener bug");
    }

    fn on_retry(&self, _: u32, _: u32, _: Duration, _: &str) -> ListenerResult {
        Err("cannot report retry".into())
    }
}

#[test]
fn test_listener_failures_do_not_abort_resolution() {
    let (_resolver, manager, _repo) = setup(ScriptedResolver::failing(1), 2);
    let locators = parse_all(["mvn://org.example:lib-a:1.0.0", "mvn://org.example:lib-b:1.0"]).unwrap();

    let result = manager.resolve(&locators, &Panicking).unwrap();

    assert_eq!(result.len(), 2);
}

#[test]
fn test_materialized_files_are_byte_identical() {
    let (_resolver, manager, repo) = setup(ScriptedResolver::new(), 0);
    let out = TempDir::new().unwrap();
    let locators = parse_all([
        "mvn://org.example:lib-a:1.0.0",
        "mvn://org.example:lib-b:2.0:sources?transitive=false",
    ])
    .unwrap();

    let result = manager.resolve(&locators, &NoopListener).unwrap();
    let written = Materializer::new(repo.path())
        .save_all(&result, out.path())
        .unwrap();

    assert_eq!(written.len(), 2);
    for (artifact, target) in result.iter().zip(&written) {
        assert_eq!(
            target.strip_prefix(out.path()).unwrap(),
            artifact.path().strip_prefix(repo.path()).unwrap()
        );
        assert_eq!(fs::read(target).unwrap(), fs::read(artifact.path()).unwrap());
    }
    assert!(
        out.path()
            .join("org/example/lib-b/2.0/lib-b-2.0-sources.jar")
            .exists()
    );
}

#[test]
fn test_direct_links_pass_through() {
    let (resolver, manager, _repo) = setup(ScriptedResolver::new(), 0);
    let locators = parse_all(["https://example.com/a.jar", "file:///opt/b.jar"]).unwrap();

    let request = manager.categorize(&locators);
    assert_eq!(request.direct_links().len(), 2);

    assert!(manager.resolve(&locators, &NoopListener).unwrap().is_empty());
    assert!(resolver.calls().is_empty());
}
