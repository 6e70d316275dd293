//! Error types for codecov-nx
//!
//! This module provides error handling for the crate, including:
//! - Domain-specific error variants (discovery, verification, upload, etc.)
//! - Process exit code mapping for the CI binary
//!
//! Exit codes follow the BSD `sysexits` convention where a variant has a
//! natural match, with plain `1` reserved for upload failures that are meant
//! to fail the CI run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for codecov-nx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for codecov-nx
///
/// This is the primary error type used throughout the crate. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "INPUT_OS")
        key: Option<String>,
    },

    /// Coverage report discovery failed (filesystem enumeration error)
    #[error("discovery failed under {path}: {source}")]
    Discovery {
        /// The directory that could not be enumerated
        path: PathBuf,
        /// The underlying filesystem error
        source: std::io::Error,
    },

    /// Network error while fetching the uploader binary or its metadata
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploader binary integrity verification failed
    #[error("uploader verification failed for {path}: expected sha256 {expected}, got {actual}")]
    Verification {
        /// Path the binary was written to
        path: PathBuf,
        /// Digest published in the checksum file
        expected: String,
        /// Digest computed over the downloaded bytes
        actual: String,
    },

    /// The published checksum file could not be parsed
    #[error("invalid checksum file: {0}")]
    InvalidChecksum(String),

    /// Uploader invocation failed (spawn error or non-zero exit)
    #[error("upload failed: {0}")]
    Upload(String),

    /// Platform or feature not supported (unknown os input, missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convert errors to process exit codes for the CI binary
///
/// This trait maps domain errors to the exit code the `codecov-nx` binary
/// terminates with, so CI systems can distinguish failure classes.
pub trait ToExitCode {
    /// Get the process exit code for this error
    fn exit_code(&self) -> i32;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        match self {
            // EX_CONFIG - bad environment / inputs
            Error::Config { .. } => 78,

            // EX_IOERR - filesystem failures
            Error::Discovery { .. } => 74,
            Error::Io(_) => 74,

            // EX_UNAVAILABLE - the uploader could not be fetched
            Error::Network(_) => 69,

            // EX_DATAERR - the fetched binary or checksum file is bad
            Error::Verification { .. } => 65,
            Error::InvalidChecksum(_) => 65,

            // Plain 1 - the canonical "fail the CI run" code
            Error::Upload(_) => 1,

            // EX_SOFTWARE - internal / unsupported conditions
            Error::NotSupported(_) => 70,
            Error::Serialization(_) => 70,
        }
    }
}
