//! # codecov-nx
//!
//! Codecov uploader orchestration for Nx monorepo CI pipelines.
//!
//! ## What it does
//!
//! Nx test runs leave one istanbul-style coverage report per project under a
//! shared `coverage/` tree. This crate turns that tree into per-project
//! Codecov uploads:
//!
//! 1. **Fetch** the platform-specific Codecov uploader binary and verify its
//!    SHA-256 digest against the published checksum
//! 2. **Locate** every `*-final.json` report and derive its Codecov flag
//!    from the workspace layout (`coverage/libs/foo/...` uploads as `foo`)
//! 3. **Dispatch** one uploader invocation per report, concurrently, with
//!    per-report failure isolation
//! 4. **Clean up** each report file after its upload attempt, so re-runs
//!    never double-upload
//!
//! ## Quick Start
//!
//! ```no_run
//! use codecov_nx::{Config, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // In CI the binary builds this from INPUT_* environment variables
//!     let mut config = Config::default();
//!     config.upload.fail_ci = true;
//!
//!     let summary = run(config).await?;
//!     println!("uploaded {} coverage reports", summary.uploaded);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Cleanup of uploaded coverage reports
pub mod cleanup;
/// Configuration types
pub mod config;
/// Concurrent upload dispatch
pub mod dispatch;
/// Error types
pub mod error;
/// Uploader binary download and verification
pub mod fetch;
/// Coverage report discovery
pub mod locator;
/// Platform detection and download URLs
pub mod platform;
/// Failure reporting
pub mod reporter;
/// Retry logic with exponential backoff
pub mod retry;
/// Uploader invocation (trait, CLI runner, dry run)
pub mod uploader;
/// Uploader version metadata
pub mod version;

// Re-export commonly used types
pub use config::{Config, RetryConfig, UploadConfig, UploaderConfig};
pub use dispatch::{DispatchSummary, Dispatcher};
pub use error::{Error, Result, ToExitCode};
pub use fetch::FetchedUploader;
pub use locator::{CoverageArtifact, LocateOptions, locate, locate_in};
pub use platform::Platform;
pub use reporter::{FailureReporter, RecordingReporter, ReportedFailure, TracingReporter};
pub use uploader::{CliUploaderRunner, DryRunUploader, InvocationDescriptor, UploaderRunner};

use std::path::PathBuf;
use std::sync::Arc;

/// Execute a complete upload run
///
/// Detects (or accepts) the platform, obtains a verified uploader binary,
/// logs version metadata, discovers coverage reports under the conventional
/// `coverage/` tree, dispatches one upload per report, and finally removes
/// the downloaded uploader binary. A dry run skips all network access and
/// logs the invocations instead.
///
/// # Errors
///
/// Any fetch, verification, or discovery error aborts before uploads start.
/// Upload failures become an error only when `fail_ci` is set, and only
/// after every artifact has been attempted and cleaned up.
pub async fn run(config: Config) -> Result<DispatchSummary> {
    let platform = match &config.uploader.os {
        Some(os) => Platform::from_input(os)?,
        None => Platform::detect()?,
    };
    tracing::info!(platform = %platform, dry_run = config.upload.dry_run, "starting codecov-nx");

    let reporter: Arc<dyn FailureReporter> = Arc::new(TracingReporter::new());

    let (runner, uploader): (Arc<dyn UploaderRunner>, FetchedUploader) = if config.upload.dry_run {
        let uploader = FetchedUploader {
            path: PathBuf::from(platform.uploader_name()),
            downloaded: false,
        };
        (Arc::new(DryRunUploader::new()), uploader)
    } else {
        let uploader = fetch::fetch_uploader(&config, platform).await?;
        version::log_version_info(
            &config.uploader.base_url,
            platform,
            &config.uploader.version,
            config.uploader.fetch_timeout,
        )
        .await;
        (Arc::new(CliUploaderRunner::new()), uploader)
    };

    let artifacts = locate(LocateOptions {
        verbose: config.upload.verbose,
    })
    .await?;

    let dispatcher = Dispatcher::new(runner, Arc::clone(&reporter), config.upload.clone());
    let result = dispatcher.dispatch(artifacts, &uploader.path).await;

    // The downloaded binary is a run-scoped artifact; leaving it behind
    // would let a later CI step execute a stale uploader.
    if uploader.downloaded
        && let Err(e) = tokio::fs::remove_file(&uploader.path).await
    {
        reporter.report(
            &format!(
                "Codecov: Could not remove uploader binary {}: {e}",
                uploader.path.display()
            ),
            false,
        );
    }

    result
}
