//! Configuration types for codecov-nx

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL the uploader binary is published under
pub const DEFAULT_BASE_URL: &str = "https://uploader.codecov.io";

/// Uploader retrieval configuration (platform, version, download location)
///
/// Groups settings related to how the uploader binary is obtained.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Platform override (e.g., "linux", "macos"); auto-detected if None
    #[serde(default)]
    pub os: Option<String>,

    /// Uploader version to fetch (default: "latest")
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL the uploader binary is published under
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory the uploader binary is written to (default: ".")
    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,

    /// Use a preinstalled `codecov` binary from PATH instead of downloading
    #[serde(default)]
    pub use_preinstalled: bool,

    /// HTTP timeout for the binary and checksum downloads (default: 30s)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: Duration,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            os: None,
            version: default_version(),
            base_url: default_base_url(),
            dest_dir: default_dest_dir(),
            use_preinstalled: false,
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

/// Upload behavior configuration (token, flags, concurrency)
///
/// Groups settings that shape each uploader invocation.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Repository upload token passed to the uploader (None for tokenless)
    #[serde(default)]
    pub token: Option<String>,

    /// Codecov API URL override passed to the uploader
    #[serde(default)]
    pub url: Option<String>,

    /// Emit per-artifact discovery diagnostics and verbose uploader output
    #[serde(default)]
    pub verbose: bool,

    /// Fail the overall run when any single upload fails
    #[serde(default)]
    pub fail_ci: bool,

    /// Log the uploader invocations instead of executing them
    #[serde(default)]
    pub dry_run: bool,

    /// Additional arguments appended to every uploader invocation
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Maximum concurrent uploader invocations (default: 4)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_uploads: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            token: None,
            url: None,
            verbose: false,
            fail_ci: false,
            dry_run: false,
            extra_args: Vec::new(),
            max_concurrent_uploads: default_max_concurrent(),
        }
    }
}

/// Retry behavior for transient download failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 500ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// Upper bound on any single retry delay (default: 10s)
    #[serde(default = "default_max_delay")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each attempt (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to retry delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for a codecov-nx run
///
/// Fields are organized into logical sub-configs:
/// - [`uploader`](UploaderConfig) — how the uploader binary is obtained
/// - [`upload`](UploadConfig) — how each upload invocation behaves
/// - [`retry`](RetryConfig) — transient-failure retry policy for downloads
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Uploader retrieval settings
    #[serde(flatten)]
    pub uploader: UploaderConfig,

    /// Upload invocation settings
    #[serde(flatten)]
    pub upload: UploadConfig,

    /// Retry policy for the binary and checksum downloads
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Build a configuration from the CI environment
    ///
    /// Reads GitHub-Actions style `INPUT_*` variables (empty values count as
    /// unset) plus `CODECOV_TOKEN` as the token fallback:
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `INPUT_OS` | `uploader.os` |
    /// | `INPUT_VERSION` | `uploader.version` |
    /// | `INPUT_BASE_URL` | `uploader.base_url` |
    /// | `INPUT_USE_PREINSTALLED` | `uploader.use_preinstalled` |
    /// | `INPUT_TOKEN` / `CODECOV_TOKEN` | `upload.token` |
    /// | `INPUT_URL` | `upload.url` |
    /// | `INPUT_VERBOSE` | `upload.verbose` |
    /// | `INPUT_FAIL_CI_IF_ERROR` | `upload.fail_ci` |
    /// | `INPUT_DRY_RUN` | `upload.dry_run` |
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a boolean input holds an
    /// unrecognizable value.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(os) = read_input("OS") {
            config.uploader.os = Some(os);
        }
        if let Some(version) = read_input("VERSION") {
            config.uploader.version = version;
        }
        if let Some(base_url) = read_input("BASE_URL") {
            config.uploader.base_url = base_url;
        }
        if let Some(value) = read_input("USE_PREINSTALLED") {
            config.uploader.use_preinstalled = parse_bool(&value, "INPUT_USE_PREINSTALLED")?;
        }

        config.upload.token = read_input("TOKEN").or_else(|| read_env("CODECOV_TOKEN"));
        config.upload.url = read_input("URL");

        if let Some(value) = read_input("VERBOSE") {
            config.upload.verbose = parse_bool(&value, "INPUT_VERBOSE")?;
        }
        if let Some(value) = read_input("FAIL_CI_IF_ERROR") {
            config.upload.fail_ci = parse_bool(&value, "INPUT_FAIL_CI_IF_ERROR")?;
        }
        if let Some(value) = read_input("DRY_RUN") {
            config.upload.dry_run = parse_bool(&value, "INPUT_DRY_RUN")?;
        }

        Ok(config)
    }
}

/// Read a GitHub-Actions style input variable, treating empty values as unset
fn read_input(name: &str) -> Option<String> {
    read_env(&format!("INPUT_{name}"))
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a boolean CI input ("true"/"false", "1"/"0", "yes"/"no", "on"/"off")
fn parse_bool(value: &str, key: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::Config {
            message: format!("expected a boolean, got '{other}'"),
            key: Some(key.to_string()),
        }),
    }
}

fn default_version() -> String {
    "latest".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_dest_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_concurrent() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}
