//! Per-artifact uploader invocation descriptors

use crate::config::UploadConfig;
use crate::locator::CoverageArtifact;
use std::ffi::OsString;
use std::path::PathBuf;

/// The arguments and options for a single uploader invocation
///
/// Created fresh per artifact, never shared, and discarded after the
/// subprocess call returns. The `fail_ci` policy flag travels with the
/// descriptor so the failure handling for this exact invocation is
/// unambiguous.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationDescriptor {
    /// Coverage report files this invocation uploads (exactly one per artifact)
    pub files: Vec<PathBuf>,
    /// Codecov flag tagging the upload with a project identifier
    pub flag: Option<String>,
    /// Repository upload token
    pub token: Option<String>,
    /// Codecov API URL override
    pub url: Option<String>,
    /// Pass verbose output flags to the uploader
    pub verbose: bool,
    /// Whether a failure of this invocation should fail the overall run
    pub fail_ci: bool,
    /// Additional arguments appended verbatim
    pub extra_args: Vec<String>,
}

impl InvocationDescriptor {
    /// Build the descriptor for one discovered artifact
    ///
    /// The upload is scoped to exactly that artifact's file and tagged with
    /// its flag name. An empty flag (a report sitting directly under the
    /// coverage root) produces an untagged upload rather than an empty `-F`
    /// argument, which the uploader rejects.
    pub fn for_artifact(artifact: &CoverageArtifact, config: &UploadConfig) -> Self {
        let flag = if artifact.flag_name.is_empty() {
            None
        } else {
            Some(artifact.flag_name.clone())
        };

        Self {
            files: vec![artifact.coverage_file_path.clone()],
            flag,
            token: config.token.clone(),
            url: config.url.clone(),
            verbose: config.verbose,
            fail_ci: config.fail_ci,
            extra_args: config.extra_args.clone(),
        }
    }

    /// Render the command-line arguments for this invocation
    ///
    /// The order is stable: files, flag, token, url, verbosity, the
    /// exit-nonzero flag, then any extra arguments.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::new();

        for file in &self.files {
            args.push(OsString::from("-f"));
            args.push(file.clone().into_os_string());
        }

        if let Some(flag) = &self.flag {
            args.push(OsString::from("-F"));
            args.push(OsString::from(flag));
        }

        if let Some(token) = &self.token {
            args.push(OsString::from("-t"));
            args.push(OsString::from(token));
        }

        if let Some(url) = &self.url {
            args.push(OsString::from("-u"));
            args.push(OsString::from(url));
        }

        if self.verbose {
            args.push(OsString::from("-v"));
        }

        if self.fail_ci {
            args.push(OsString::from("-Z"));
        }

        for extra in &self.extra_args {
            args.push(OsString::from(extra));
        }

        args
    }
}
