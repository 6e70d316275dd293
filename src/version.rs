//! Uploader version metadata
//!
//! Codecov publishes a small JSON document per platform describing the
//! latest uploader release. Logging it alongside the requested version makes
//! CI logs self-describing about what actually ran. Nothing here is fatal:
//! a run must not fail because version metadata was unavailable.

use crate::error::Result;
use crate::platform::{self, Platform};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Latest-release metadata published per platform
#[derive(Debug, Deserialize)]
struct VersionMetadata {
    /// Version tag of the latest published uploader (e.g., "v0.7.3")
    version: String,
}

/// Fetch the latest published uploader version for a platform
async fn latest_version(base_url: &str, platform: Platform, timeout: Duration) -> Result<String> {
    let url = platform::latest_metadata_url(base_url, platform)?;
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let metadata: VersionMetadata = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(metadata.version)
}

/// Log which uploader version this run uses
///
/// Reports the requested version together with the latest published one so
/// pinned runs show how far behind they are. Metadata failures are logged
/// and swallowed.
pub async fn log_version_info(
    base_url: &str,
    platform: Platform,
    requested: &str,
    timeout: Duration,
) {
    match latest_version(base_url, platform, timeout).await {
        Ok(latest) => {
            info!(
                requested = %requested,
                latest = %latest,
                platform = %platform,
                "uploader version"
            );
        }
        Err(e) => {
            warn!(error = %e, "could not fetch uploader version metadata");
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn latest_version_parses_metadata_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/linux/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "version": "v0.7.3",
                    "timestamp": "2024-01-10T00:00:00Z"
                })),
            )
            .mount(&server)
            .await;

        let version = latest_version(&server.uri(), Platform::Linux, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(version, "v0.7.3");
    }

    #[tokio::test]
    async fn latest_version_propagates_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/macos/latest"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = latest_version(&server.uri(), Platform::Macos, Duration::from_secs(5)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn log_version_info_swallows_failures() {
        // Nothing listening on this port; must not panic or error
        log_version_info(
            "http://127.0.0.1:9",
            Platform::Linux,
            "latest",
            Duration::from_millis(100),
        )
        .await;
    }
}
