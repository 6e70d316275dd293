//! Failure reporting for upload and cleanup outcomes
//!
//! Every failure in the pipeline flows through a [`FailureReporter`] with an
//! explicit "fail the CI run" flag, instead of being raised at the point of
//! failure. Reporters must be safe to call from concurrently running
//! per-artifact tasks; reporting is append-only and carries no ordering
//! guarantee.

use std::sync::Mutex;

/// Trait for reporting per-artifact failures
pub trait FailureReporter: Send + Sync {
    /// Report a failure message
    ///
    /// # Arguments
    ///
    /// * `message` - Human-readable message, already carrying the `Codecov:`
    ///   product tag
    /// * `fail_ci` - Whether this failure should fail the overall run
    fn report(&self, message: &str, fail_ci: bool);
}

/// Reporter that emits failures through `tracing`
///
/// Fatal failures (those with `fail_ci` set) are logged at error level,
/// everything else at warn level. The decision to actually fail the run is
/// made by the dispatcher once all artifacts have settled.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a new tracing-backed reporter
    pub fn new() -> Self {
        Self
    }
}

impl FailureReporter for TracingReporter {
    fn report(&self, message: &str, fail_ci: bool) {
        if fail_ci {
            tracing::error!(fail_ci, "{message}");
        } else {
            tracing::warn!(fail_ci, "{message}");
        }
    }
}

/// A reported failure captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFailure {
    /// The reported message
    pub message: String,
    /// Whether the failure was flagged as fatal to the run
    pub fail_ci: bool,
}

/// Reporter that records failures in memory
///
/// Useful for tests and for embedders that want to collect failure messages
/// and surface them through their own channel.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<ReportedFailure>>,
}

impl RecordingReporter {
    /// Create a new recording reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all failures reported so far
    pub fn failures(&self) -> Vec<ReportedFailure> {
        self.failures
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }
}

impl FailureReporter for RecordingReporter {
    fn report(&self, message: &str, fail_ci: bool) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(ReportedFailure {
                message: message.to_string(),
                fail_ci,
            });
        }
    }
}
