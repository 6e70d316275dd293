//! CLI-based uploader runner executing the real Codecov binary

use super::invocation::InvocationDescriptor;
use super::traits::UploaderRunner;
use crate::error::Error;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runner that executes the uploader binary as a subprocess
///
/// The binary path is supplied per call (it is only known once the
/// download-and-verify step has produced it), so the runner itself is
/// stateless.
///
/// # Examples
///
/// ```no_run
/// use codecov_nx::uploader::{CliUploaderRunner, UploaderRunner, InvocationDescriptor};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let runner = CliUploaderRunner::new();
/// let invocation = InvocationDescriptor {
///     files: vec![PathBuf::from("coverage/libs/foo/coverage-final.json")],
///     flag: Some("foo".to_string()),
///     token: None,
///     url: None,
///     verbose: false,
///     fail_ci: false,
///     extra_args: vec![],
/// };
/// runner.run(Path::new("./codecov"), &invocation).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct CliUploaderRunner;

impl CliUploaderRunner {
    /// Create a new CLI runner
    pub fn new() -> Self {
        Self
    }

    /// Attempt to find a preinstalled `codecov` binary in PATH
    ///
    /// Used when the run is configured to skip the download. Returns
    /// `Some(path)` if the binary is found, `None` otherwise.
    pub fn preinstalled() -> Option<PathBuf> {
        which::which("codecov").ok()
    }
}

#[async_trait]
impl UploaderRunner for CliUploaderRunner {
    async fn run(&self, binary: &Path, invocation: &InvocationDescriptor) -> crate::Result<()> {
        let output = Command::new(binary)
            .args(invocation.args())
            .output()
            .await
            .map_err(|e| {
                Error::Upload(format!(
                    "failed to execute uploader at {}: {e}",
                    binary.display()
                ))
            })?;

        if output.status.success() {
            if invocation.verbose {
                tracing::debug!(
                    stdout = %String::from_utf8_lossy(&output.stdout),
                    "uploader finished"
                );
            }
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(Error::Upload(format!(
            "uploader exited with status {exit}: {}",
            stderr.trim()
        )))
    }

    fn name(&self) -> &'static str {
        "cli-codecov"
    }
}
