//! Dry-run uploader that logs invocations instead of executing them

use super::invocation::InvocationDescriptor;
use super::traits::UploaderRunner;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Runner used when the run is configured as a dry run
///
/// Logs the exact command line each artifact would be uploaded with and
/// reports success. Lets a pipeline change be validated end to end (discovery,
/// flag derivation, cleanup) without sending anything to Codecov.
#[derive(Debug, Default)]
pub struct DryRunUploader;

impl DryRunUploader {
    /// Create a new dry-run uploader
    pub fn new() -> Self {
        Self
    }
}

/// Render the invocation arguments with the upload token redacted
///
/// The token must never be echoed into CI logs.
fn redacted_args(invocation: &InvocationDescriptor) -> Vec<String> {
    let mut args = Vec::new();
    let mut redact_next = false;
    for arg in invocation.args() {
        let arg = arg.to_string_lossy().into_owned();
        if redact_next {
            args.push("<redacted>".to_string());
            redact_next = false;
            continue;
        }
        redact_next = arg == "-t";
        args.push(arg);
    }
    args
}

#[async_trait]
impl UploaderRunner for DryRunUploader {
    async fn run(&self, binary: &Path, invocation: &InvocationDescriptor) -> crate::Result<()> {
        info!(
            binary = ?binary,
            args = ?redacted_args(invocation),
            flag = invocation.flag.as_deref().unwrap_or(""),
            "dry run: skipping upload"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
