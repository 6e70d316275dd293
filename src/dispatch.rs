//! Concurrent per-artifact upload dispatch
//!
//! Every discovered artifact gets an independent upload-and-cleanup
//! sequence. Sequences run concurrently with no ordering between them and no
//! shared state beyond the failure reporter; one artifact's failure never
//! prevents attempts on the others. Only after every sequence has settled
//! does the dispatcher decide whether the run as a whole failed.

use crate::cleanup;
use crate::config::UploadConfig;
use crate::error::{Error, Result};
use crate::locator::CoverageArtifact;
use crate::reporter::FailureReporter;
use crate::uploader::{InvocationDescriptor, UploaderRunner};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one artifact's upload-and-cleanup sequence
#[derive(Debug, Clone)]
struct ArtifactOutcome {
    uploaded: bool,
    /// Upload failed and its `fail_ci` flag marks it fatal to the run
    fatal: bool,
    cleaned_up: bool,
    error: Option<String>,
}

/// Aggregate result of a dispatch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Artifacts for which an upload was attempted
    pub attempted: usize,
    /// Artifacts uploaded successfully
    pub uploaded: usize,
    /// Artifacts whose upload failed (fatal or not)
    pub failed: usize,
    /// Artifacts whose report file could not be removed
    pub cleanup_failures: usize,
}

/// Tally per-artifact outcomes into a summary, the number of fatal failures,
/// and the first fatal error message
fn tally(outcomes: &[ArtifactOutcome]) -> (DispatchSummary, usize, Option<String>) {
    let mut summary = DispatchSummary {
        attempted: outcomes.len(),
        ..DispatchSummary::default()
    };
    let mut fatal_failures = 0;
    let mut first_fatal_error = None;

    for outcome in outcomes {
        if outcome.uploaded {
            summary.uploaded += 1;
        } else {
            summary.failed += 1;
        }
        if !outcome.cleaned_up {
            summary.cleanup_failures += 1;
        }
        if outcome.fatal {
            fatal_failures += 1;
            if first_fatal_error.is_none() {
                first_fatal_error = outcome.error.clone();
            }
        }
    }

    (summary, fatal_failures, first_fatal_error)
}

/// Fans uploads out over discovered artifacts and aggregates failures
pub struct Dispatcher {
    runner: Arc<dyn UploaderRunner>,
    reporter: Arc<dyn FailureReporter>,
    config: UploadConfig,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// # Arguments
    ///
    /// * `runner` - Executes individual uploader invocations
    /// * `reporter` - Receives every per-artifact failure
    /// * `config` - Upload options threaded into each invocation
    pub fn new(
        runner: Arc<dyn UploaderRunner>,
        reporter: Arc<dyn FailureReporter>,
        config: UploadConfig,
    ) -> Self {
        Self {
            runner,
            reporter,
            config,
        }
    }

    /// Upload every artifact and clean up its report file
    ///
    /// Artifacts are processed concurrently (bounded by
    /// `max_concurrent_uploads`) and independently: each one gets exactly one
    /// upload attempt and exactly one cleanup, success or failure alike. The
    /// call resolves only after all sequences have settled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] if any artifact's upload failed with its
    /// `fail_ci` flag set. Non-fatal upload failures and cleanup failures
    /// are reported through the failure reporter and surface only in the
    /// summary.
    pub async fn dispatch(
        &self,
        artifacts: Vec<CoverageArtifact>,
        uploader: &Path,
    ) -> Result<DispatchSummary> {
        if artifacts.is_empty() {
            info!("no coverage reports found, nothing to upload");
            return Ok(DispatchSummary::default());
        }

        let concurrency = self.config.max_concurrent_uploads.max(1);
        let total = artifacts.len();
        info!(
            reports = total,
            concurrency,
            runner = self.runner.name(),
            "dispatching coverage uploads"
        );

        let outcomes: Vec<ArtifactOutcome> = stream::iter(artifacts)
            .map(|artifact| self.process_artifact(artifact, uploader))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let (summary, fatal_failures, first_fatal_error) = tally(&outcomes);
        info!(
            uploaded = summary.uploaded,
            failed = summary.failed,
            cleanup_failures = summary.cleanup_failures,
            "dispatch complete"
        );

        if fatal_failures > 0 {
            return Err(Error::Upload(format!(
                "{fatal_failures} of {total} coverage uploads failed. First error: {}",
                first_fatal_error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Ok(summary)
    }

    /// One artifact's upload-and-cleanup sequence
    ///
    /// Never returns an error: failures are folded into the outcome and
    /// reported, so a single artifact cannot take down the fan-out.
    async fn process_artifact(
        &self,
        artifact: CoverageArtifact,
        uploader: &Path,
    ) -> ArtifactOutcome {
        let invocation = InvocationDescriptor::for_artifact(&artifact, &self.config);
        let fail_ci = invocation.fail_ci;

        let (uploaded, fatal, error) = match self.runner.run(uploader, &invocation).await {
            Ok(()) => {
                debug!(
                    flag = %artifact.flag_name,
                    path = ?artifact.coverage_file_path,
                    "uploaded coverage report"
                );
                (true, false, None)
            }
            Err(e) => {
                self.reporter.report(
                    &format!(
                        "Codecov: Failed to properly upload {}: {e}",
                        artifact.coverage_file_path.display()
                    ),
                    fail_ci,
                );
                (false, fail_ci, Some(e.to_string()))
            }
        };

        // Exactly one cleanup per artifact, regardless of the upload outcome
        let cleaned_up = match cleanup::remove_report(&artifact.coverage_file_path).await {
            Ok(()) => true,
            Err(e) => {
                self.reporter.report(
                    &format!(
                        "Codecov: Could not remove coverage file {}: {e}",
                        artifact.coverage_file_path.display()
                    ),
                    false,
                );
                false
            }
        };

        ArtifactOutcome {
            uploaded,
            fatal,
            cleaned_up,
            error,
        }
    }
}
