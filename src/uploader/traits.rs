//! Trait for running the external Codecov uploader

use super::invocation::InvocationDescriptor;
use async_trait::async_trait;
use std::path::Path;

/// Trait for executing one uploader invocation
///
/// Implementations run the uploader binary at `binary` with the arguments
/// described by `invocation`, resolving on a zero exit status and failing
/// otherwise. The binary path is passed per call because it is only known
/// after the download-and-verify step has run.
#[async_trait]
pub trait UploaderRunner: Send + Sync {
    /// Run one upload
    ///
    /// # Arguments
    ///
    /// * `binary` - Path to the verified uploader executable
    /// * `invocation` - Arguments and options for this upload
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Upload`] if the process cannot be spawned or
    /// exits with a non-zero status.
    async fn run(&self, binary: &Path, invocation: &InvocationDescriptor) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
