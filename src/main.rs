//! CI entry point for codecov-nx
//!
//! Reads configuration from the environment, runs the upload pipeline, and
//! maps failures to distinct process exit codes.

use codecov_nx::{Config, ToExitCode, run};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Codecov: invalid configuration");
            std::process::exit(e.exit_code());
        }
    };

    match run(config).await {
        Ok(summary) => {
            tracing::info!(
                attempted = summary.attempted,
                uploaded = summary.uploaded,
                failed = summary.failed,
                cleanup_failures = summary.cleanup_failures,
                "codecov-nx finished"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Codecov: run failed");
            std::process::exit(e.exit_code());
        }
    }
}
