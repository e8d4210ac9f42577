//! Progress reporting
//!
//! [`ProgressListener`] is the public callback surface; every method has a
//! no-op default so implementors only override what they care about.
//! [`ProgressNotifier`] adapts raw resolver events and retry notifications to
//! that surface and isolates listener failures: an error returned by a
//! callback, or a panic inside one, is logged and resolution carries on.

use crate::artifact::ResolvedArtifact;
use crate::classify::{RequestContext, describe_failure};
use crate::resolver::{ResolutionEvents, TransferEvent};
use crate::retry::RetryContext;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, warn};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type ListenerResult = Result<(), ListenerError>;

/// Description used when a transfer failure carries no cause
pub const NO_CAUSE: &str = "n/a";

pub trait ProgressListener: Send + Sync {
    fn on_retry(
        &self,
        _try_count: u32,
        _max_retries: u32,
        _interval: Duration,
        _cause: &str,
    ) -> ListenerResult {
        Ok(())
    }

    fn on_transfer_failed(&self, _description: &str) -> ListenerResult {
        Ok(())
    }

    /// May be called more than once for the same artifact
    fn on_dependency_resolved(&self, _artifact: &ResolvedArtifact) -> ListenerResult {
        Ok(())
    }
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ProgressListener for NoopListener {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    RetryOccurred {
        try_count: u32,
        max_retries: u32,
        interval: Duration,
        cause: String,
    },
    TransferFailed {
        description: String,
    },
    ArtifactResolved(ResolvedArtifact),
}

impl ProgressEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::RetryOccurred { .. } => "retry_occurred",
            ProgressEvent::TransferFailed { .. } => "transfer_failed",
            ProgressEvent::ArtifactResolved(_) => "artifact_resolved",
        }
    }
}

pub struct ProgressNotifier<'a> {
    listener: &'a dyn ProgressListener,
}

impl<'a> ProgressNotifier<'a> {
    pub fn new(listener: &'a dyn ProgressListener) -> Self {
        Self { listener }
    }

    /// Report a scheduled retry with a message derived from the request
    pub fn retry_occurred(&self, retry: &RetryContext<'_>, context: &RequestContext<'_>) {
        let cause = describe_failure(context, retry.last_error);
        warn!(
            attempt = retry.try_count,
            max_retries = retry.max_retries,
            interval_ms = retry.interval.as_millis() as u64,
            "{}, retrying",
            cause
        );
        self.publish(ProgressEvent::RetryOccurred {
            try_count: retry.try_count,
            max_retries: retry.max_retries,
            interval: retry.interval,
            cause,
        });
    }

    pub fn publish(&self, event: ProgressEvent) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &event {
            ProgressEvent::RetryOccurred {
                try_count,
                max_retries,
                interval,
                cause,
            } => self
                .listener
                .on_retry(*try_count, *max_retries, *interval, cause),
            ProgressEvent::TransferFailed { description } => {
                self.listener.on_transfer_failed(description)
            }
            ProgressEvent::ArtifactResolved(artifact) => {
                self.listener.on_dependency_resolved(artifact)
            }
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(event = event.name(), "progress listener failed: {}", e),
            Err(_) => warn!(event = event.name(), "progress listener panicked"),
        }
    }
}

impl ResolutionEvents for ProgressNotifier<'_> {
    fn transfer_failed(&self, event: &TransferEvent) {
        let error = event.error.as_deref().unwrap_or(NO_CAUSE);
        let description = format!("{}, error: {}", event, error);
        warn!("{}", description);
        self.publish(ProgressEvent::TransferFailed { description });
    }

    fn artifact_resolved(&self, artifact: &ResolvedArtifact) {
        debug!(artifact = %artifact.coordinate, path = %artifact.path.display(), "resolved");
        self.publish(ProgressEvent::ArtifactResolved(artifact.clone()));
    }
}
