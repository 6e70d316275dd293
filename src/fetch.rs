//! Uploader binary retrieval and integrity verification
//!
//! Downloads the platform-specific Codecov uploader over HTTPS, checks the
//! bytes against the published SHA-256 checksum, and installs the binary
//! into the configured directory with execute permissions. A checksum
//! mismatch is fatal: an unverified uploader is never written to disk.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::{self, Platform};
use crate::retry::fetch_with_retry;
use crate::uploader::CliUploaderRunner;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A ready-to-run uploader binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedUploader {
    /// Path of the executable
    pub path: PathBuf,
    /// Whether this run downloaded the binary (and therefore owns its
    /// removal); false for a preinstalled uploader
    pub downloaded: bool,
}

/// Obtain a verified uploader binary for `platform`
///
/// When the configuration asks for a preinstalled binary, PATH is searched
/// first and the download is skipped entirely; otherwise the binary and its
/// checksum file are fetched (with retry on transient network failures),
/// the digest is verified, and the binary is written executable into the
/// configured destination directory.
///
/// # Errors
///
/// - [`Error::Network`] when the binary or checksum cannot be fetched
/// - [`Error::Verification`] when the digest does not match
/// - [`Error::InvalidChecksum`] when the checksum file cannot be parsed
/// - [`Error::Io`] when the binary cannot be written or made executable
pub async fn fetch_uploader(config: &Config, platform: Platform) -> Result<FetchedUploader> {
    if config.uploader.use_preinstalled {
        if let Some(path) = CliUploaderRunner::preinstalled() {
            info!(path = ?path, "using preinstalled uploader from PATH");
            return Ok(FetchedUploader {
                path,
                downloaded: false,
            });
        }
        warn!("no preinstalled uploader found in PATH, falling back to download");
    }

    let version = &config.uploader.version;
    let binary_url = platform::uploader_url(&config.uploader.base_url, platform, version)?;
    let checksum_url = platform::checksum_url(&config.uploader.base_url, platform, version)?;

    let client = reqwest::Client::builder()
        .timeout(config.uploader.fetch_timeout)
        .build()?;

    info!(url = %binary_url, platform = %platform, "downloading uploader");
    let bytes = fetch_with_retry(&config.retry, || {
        let client = client.clone();
        let url = binary_url.clone();
        async move {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok::<_, Error>(response.bytes().await?)
        }
    })
    .await?;

    let checksum_text = fetch_with_retry(&config.retry, || {
        let client = client.clone();
        let url = checksum_url.clone();
        async move {
            let response = client.get(url).send().await?.error_for_status()?;
            Ok::<_, Error>(response.text().await?)
        }
    })
    .await?;

    let destination = config.uploader.dest_dir.join(platform.uploader_name());

    let expected = parse_checksum(&checksum_text, platform.uploader_name())?;
    let actual = sha256_hex(&bytes);
    if expected != actual {
        return Err(Error::Verification {
            path: destination,
            expected,
            actual,
        });
    }
    debug!(sha256 = %actual, size = bytes.len(), "uploader checksum verified");

    tokio::fs::create_dir_all(&config.uploader.dest_dir).await?;
    tokio::fs::write(&destination, &bytes).await?;
    make_executable(&destination).await?;

    info!(path = ?destination, "uploader installed");
    Ok(FetchedUploader {
        path: destination,
        downloaded: true,
    })
}

/// Hex-encoded SHA-256 digest of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Extract the expected digest from a published `SHA256SUM` file
///
/// The file uses the `sha256sum` format, one `<digest>  <filename>` pair per
/// line. The line naming `binary_name` wins; a file with a single entry is
/// accepted wholesale since some mirrors publish it without the name column.
fn parse_checksum(text: &str, binary_name: &str) -> Result<String> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    let line = lines
        .iter()
        .find(|line| {
            line.split_whitespace()
                .nth(1)
                .is_some_and(|name| name.trim_start_matches('*') == binary_name)
        })
        .or_else(|| (lines.len() == 1).then(|| &lines[0]))
        .ok_or_else(|| {
            Error::InvalidChecksum(format!("no entry for '{binary_name}' in checksum file"))
        })?;

    let digest = line
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::InvalidChecksum("empty checksum line".to_string()))?
        .to_ascii_lowercase();

    if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidChecksum(format!(
            "'{digest}' is not a sha256 digest"
        )));
    }

    Ok(digest)
}

#[cfg(unix)]
async fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = tokio::fs::metadata(path).await?.permissions();
    permissions.set_mode(0o755);
    tokio::fs::set_permissions(path, permissions).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn make_executable(_path: &std::path::Path) -> Result<()> {
    // Windows decides executability by extension
    Ok(())
}
