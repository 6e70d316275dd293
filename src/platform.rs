//! Uploader platform detection and download URL construction

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Platforms the Codecov uploader is published for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Linux (glibc, x86_64)
    Linux,
    /// Linux (glibc, aarch64)
    LinuxArm64,
    /// Alpine Linux (musl, x86_64)
    Alpine,
    /// Alpine Linux (musl, aarch64)
    AlpineArm64,
    /// macOS
    Macos,
    /// Windows
    Windows,
}

impl Platform {
    /// Detect the platform from the build target
    ///
    /// Alpine cannot be told apart from glibc Linux at this level; CI jobs
    /// running on musl images pass an explicit `os` input instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for targets the uploader is not
    /// published for.
    pub fn detect() -> Result<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "aarch64") => Ok(Platform::LinuxArm64),
            ("linux", _) => Ok(Platform::Linux),
            ("macos", _) => Ok(Platform::Macos),
            ("windows", _) => Ok(Platform::Windows),
            (os, arch) => Err(Error::NotSupported(format!(
                "no uploader is published for {os}/{arch}"
            ))),
        }
    }

    /// Parse a platform from the `os` CI input
    ///
    /// Accepts the platform names the uploader is published under, plus the
    /// aliases CI configs commonly use ("osx", "win32").
    pub fn from_input(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "linux-arm64" | "aarch64" => Ok(Platform::LinuxArm64),
            "alpine" => Ok(Platform::Alpine),
            "alpine-arm64" => Ok(Platform::AlpineArm64),
            "macos" | "osx" | "darwin" => Ok(Platform::Macos),
            "windows" | "win32" => Ok(Platform::Windows),
            other => Err(Error::NotSupported(format!("unknown os '{other}'"))),
        }
    }

    /// The path segment this platform is published under
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::LinuxArm64 => "linux-arm64",
            Platform::Alpine => "alpine",
            Platform::AlpineArm64 => "alpine-arm64",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
        }
    }

    /// File name of the uploader binary for this platform
    pub fn uploader_name(&self) -> &'static str {
        match self {
            Platform::Windows => "codecov.exe",
            _ => "codecov",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a version input into its URL path segment
///
/// "latest" stays as-is; pinned versions are prefixed with `v` the way the
/// published URLs expect ("0.7.3" and "v0.7.3" both become "v0.7.3").
fn version_segment(version: &str) -> String {
    let version = version.trim();
    if version == "latest" || version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| Error::Config {
        message: format!("invalid base URL '{base_url}': {e}"),
        key: Some("base_url".to_string()),
    })
}

/// URL the uploader binary is downloaded from
///
/// Shape: `<base>/<version>/<platform>/<uploader-name>`.
pub fn uploader_url(base_url: &str, platform: Platform, version: &str) -> Result<Url> {
    let base = parse_base(base_url)?;
    let path = format!(
        "{}/{}/{}",
        version_segment(version),
        platform.as_str(),
        platform.uploader_name()
    );
    base.join(&path).map_err(|e| Error::Config {
        message: format!("cannot build uploader URL from '{base_url}': {e}"),
        key: Some("base_url".to_string()),
    })
}

/// URL of the published SHA-256 checksum file for the uploader binary
pub fn checksum_url(base_url: &str, platform: Platform, version: &str) -> Result<Url> {
    let mut url = uploader_url(base_url, platform, version)?;
    let path = format!("{}.SHA256SUM", url.path());
    url.set_path(&path);
    Ok(url)
}

/// URL of the latest-version metadata document for a platform
///
/// Shape: `<base>/<platform>/latest`, returning `{"version": "v..."}`.
pub fn latest_metadata_url(base_url: &str, platform: Platform) -> Result<Url> {
    let base = parse_base(base_url)?;
    base.join(&format!("{}/latest", platform.as_str()))
        .map_err(|e| Error::Config {
            message: format!("cannot build metadata URL from '{base_url}': {e}"),
            key: Some("base_url".to_string()),
        })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    #[test]
    fn every_platform_maps_to_expected_segment_and_name() {
        let cases = [
            (Platform::Linux, "linux", "codecov"),
            (Platform::LinuxArm64, "linux-arm64", "codecov"),
            (Platform::Alpine, "alpine", "codecov"),
            (Platform::AlpineArm64, "alpine-arm64", "codecov"),
            (Platform::Macos, "macos", "codecov"),
            (Platform::Windows, "windows", "codecov.exe"),
        ];
        for (platform, segment, name) in cases {
            assert_eq!(platform.as_str(), segment);
            assert_eq!(platform.uploader_name(), name);
        }
    }

    #[test]
    fn from_input_accepts_published_names_and_aliases() {
        assert_eq!(Platform::from_input("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_input("Alpine").unwrap(), Platform::Alpine);
        assert_eq!(Platform::from_input("osx").unwrap(), Platform::Macos);
        assert_eq!(Platform::from_input("win32").unwrap(), Platform::Windows);
        assert_eq!(
            Platform::from_input(" linux-arm64 ").unwrap(),
            Platform::LinuxArm64
        );
    }

    #[test]
    fn from_input_rejects_unknown_os() {
        let err = Platform::from_input("solaris").unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
        assert!(err.to_string().contains("solaris"));
    }

    #[test]
    fn detect_returns_a_platform_on_supported_hosts() {
        // The test suite only runs on targets the uploader supports.
        let platform = Platform::detect().unwrap();
        assert!(!platform.as_str().is_empty());
    }

    #[test]
    fn uploader_url_for_latest() {
        let url = uploader_url(DEFAULT_BASE_URL, Platform::Linux, "latest").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/latest/linux/codecov"
        );
    }

    #[test]
    fn uploader_url_prefixes_pinned_versions_with_v() {
        let url = uploader_url(DEFAULT_BASE_URL, Platform::Macos, "0.7.3").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/v0.7.3/macos/codecov"
        );

        // An already-prefixed version is not double-prefixed
        let url = uploader_url(DEFAULT_BASE_URL, Platform::Macos, "v0.7.3").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/v0.7.3/macos/codecov"
        );
    }

    #[test]
    fn uploader_url_uses_exe_name_on_windows() {
        let url = uploader_url(DEFAULT_BASE_URL, Platform::Windows, "latest").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/latest/windows/codecov.exe"
        );
    }

    #[test]
    fn checksum_url_appends_suffix() {
        let url = checksum_url(DEFAULT_BASE_URL, Platform::Alpine, "latest").unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/latest/alpine/codecov.SHA256SUM"
        );
    }

    #[test]
    fn latest_metadata_url_shape() {
        let url = latest_metadata_url(DEFAULT_BASE_URL, Platform::LinuxArm64).unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploader.codecov.io/linux-arm64/latest"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let err = uploader_url("not a url", Platform::Linux, "latest").unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("base_url")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn custom_base_url_is_respected() {
        let url = uploader_url("http://127.0.0.1:9009", Platform::Linux, "latest").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9009/latest/linux/codecov");
    }
}
