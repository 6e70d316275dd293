//! Coverage report discovery for Nx workspace layouts
//!
//! Nx writes one istanbul-style JSON report per project under a shared
//! `coverage/` tree, mirroring the workspace layout
//! (`coverage/libs/<project>/coverage-final.json` and so on). This module
//! scans that tree and derives the metadata each upload needs: the file
//! name, the workspace-relative directory, and the Codecov flag identifying
//! the project.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Directory the coverage tree is scanned under, relative to the workspace root
pub const COVERAGE_ROOT: &str = "coverage";

/// File name suffix that marks a coverage report
pub const REPORT_SUFFIX: &str = "-final.json";

/// Leading workspace segment stripped when deriving the flag name
#[allow(clippy::expect_used)] // the pattern is a literal and cannot fail to compile
static FLAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(libs|apps)/").expect("valid literal pattern"));

/// A single coverage report discovered on disk
///
/// Immutable once constructed; consumed exactly once by the dispatcher,
/// which deletes the underlying file after the upload attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoverageArtifact {
    /// Filesystem path of the JSON coverage report
    pub coverage_file_path: PathBuf,
    /// Final path segment (e.g., "coverage-final.json")
    pub file_name: String,
    /// Directory path with the coverage root prefix stripped (e.g., "libs/foo")
    pub qualified_path: String,
    /// Qualified path with a leading "libs/" or "apps/" segment stripped,
    /// used to tag the upload with a logical project identifier
    pub flag_name: String,
}

impl CoverageArtifact {
    /// Derive an artifact from a report path found under `root`
    ///
    /// Returns None when the path has no file name or does not live under
    /// `root` (neither occurs for paths produced by the scan).
    fn from_path(root: &Path, coverage_file_path: PathBuf) -> Option<Self> {
        let file_name = coverage_file_path.file_name()?.to_string_lossy().into_owned();

        let qualified_path = coverage_file_path
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(relative_slash_path)?;

        let flag_name = FLAG_PREFIX.replace(&qualified_path, "").into_owned();

        Some(Self {
            coverage_file_path,
            file_name,
            qualified_path,
            flag_name,
        })
    }
}

/// Join path components with forward slashes, independent of platform
fn relative_slash_path(path: &Path) -> String {
    path.iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Options for a discovery pass
#[derive(Clone, Copy, Debug, Default)]
pub struct LocateOptions {
    /// Emit one diagnostic record per discovered artifact
    pub verbose: bool,
}

/// Discover coverage reports under the conventional `coverage/` tree
///
/// The search root is fixed; the scan looks for files matching the
/// `*-final.json` naming convention at any depth. An empty result is a
/// legitimate outcome (a run with no tests produces no reports).
///
/// # Errors
///
/// Returns [`Error::Discovery`] when the tree exists but cannot be
/// enumerated (permission denied, unreadable directory). A missing root is
/// not an error.
pub async fn locate(options: LocateOptions) -> Result<Vec<CoverageArtifact>> {
    locate_in(Path::new(COVERAGE_ROOT), options).await
}

/// Discover coverage reports under an explicit root
///
/// Same contract as [`locate`]; exposed so tests and embedders can point the
/// scan at a different tree.
pub async fn locate_in(root: &Path, options: LocateOptions) -> Result<Vec<CoverageArtifact>> {
    if tokio::fs::metadata(root).await.is_err() {
        tracing::debug!(root = ?root, "coverage root does not exist, nothing to upload");
        return Ok(Vec::new());
    }

    let mut report_paths = Vec::new();
    collect_reports(root.to_path_buf(), &mut report_paths).await?;

    let mut artifacts = Vec::with_capacity(report_paths.len());
    for path in report_paths {
        let Some(artifact) = CoverageArtifact::from_path(root, path) else {
            continue;
        };

        if options.verbose {
            tracing::info!(
                coverage_file_path = ?artifact.coverage_file_path,
                file_name = %artifact.file_name,
                qualified_path = %artifact.qualified_path,
                flag_name = %artifact.flag_name,
                "found coverage file"
            );
        }
        artifacts.push(artifact);
    }

    Ok(artifacts)
}

/// Recursively collect report paths under `path`
///
/// Unlike a cleanup sweep, enumeration errors here are fatal: a directory we
/// cannot read may hide reports, and silently uploading a partial set would
/// misreport coverage.
fn collect_reports(
    path: PathBuf,
    reports: &mut Vec<PathBuf>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + '_>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(&path).await.map_err(|source| {
            Error::Discovery {
                path: path.clone(),
                source,
            }
        })?;

        loop {
            let entry = entries.next_entry().await.map_err(|source| {
                Error::Discovery {
                    path: path.clone(),
                    source,
                }
            })?;
            let Some(entry) = entry else { break };

            let entry_path = entry.path();
            let file_type = entry.file_type().await.map_err(|source| {
                Error::Discovery {
                    path: entry_path.clone(),
                    source,
                }
            })?;

            if file_type.is_dir() {
                collect_reports(entry_path, reports).await?;
            } else if file_type.is_file()
                && entry_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(REPORT_SUFFIX))
            {
                reports.push(entry_path);
            }
        }

        Ok(())
    })
}
