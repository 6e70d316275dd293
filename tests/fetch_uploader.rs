//! Download-and-verify tests against a mock HTTP server.

use codecov_nx::fetch::{fetch_uploader, sha256_hex};
use codecov_nx::{Config, Error, Platform};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BINARY_BYTES: &[u8] = b"#!/bin/sh\nexit 0\n";

fn test_config(server: &MockServer, dest: &TempDir) -> Config {
    let mut config = Config::default();
    config.uploader.base_url = server.uri();
    config.uploader.dest_dir = dest.path().to_path_buf();
    config.retry.max_attempts = 0;
    config.retry.initial_delay = Duration::from_millis(1);
    config.retry.jitter = false;
    config
}

async fn mount_binary(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/latest/linux/codecov"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BINARY_BYTES))
        .mount(server)
        .await;
}

async fn mount_checksum(server: &MockServer, digest: &str) {
    Mock::given(method("GET"))
        .and(path("/latest/linux/codecov.SHA256SUM"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("{digest}  codecov\n")),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn downloads_verifies_and_installs_the_uploader() {
    let server = MockServer::start().await;
    mount_binary(&server).await;
    mount_checksum(&server, &sha256_hex(BINARY_BYTES)).await;

    let dest = TempDir::new().expect("dest dir");
    let config = test_config(&server, &dest);

    let uploader = fetch_uploader(&config, Platform::Linux)
        .await
        .expect("fetch should succeed");

    assert!(uploader.downloaded);
    assert_eq!(uploader.path, dest.path().join("codecov"));
    assert_eq!(
        std::fs::read(&uploader.path).expect("read installed binary"),
        BINARY_BYTES
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&uploader.path)
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111, "binary should be executable");
    }
}

#[tokio::test]
async fn checksum_mismatch_is_fatal_and_installs_nothing() {
    let server = MockServer::start().await;
    mount_binary(&server).await;
    // Digest of different bytes
    mount_checksum(&server, &sha256_hex(b"tampered")).await;

    let dest = TempDir::new().expect("dest dir");
    let config = test_config(&server, &dest);

    let err = fetch_uploader(&config, Platform::Linux)
        .await
        .expect_err("mismatch must fail");

    match err {
        Error::Verification {
            expected, actual, ..
        } => {
            assert_eq!(expected, sha256_hex(b"tampered"));
            assert_eq!(actual, sha256_hex(BINARY_BYTES));
        }
        other => panic!("expected Verification error, got: {other:?}"),
    }

    assert!(
        !dest.path().join("codecov").exists(),
        "an unverified binary must never land on disk"
    );
}

#[tokio::test]
async fn missing_binary_is_a_network_error() {
    let server = MockServer::start().await;
    // No mounts: every request 404s

    let dest = TempDir::new().expect("dest dir");
    let config = test_config(&server, &dest);

    let err = fetch_uploader(&config, Platform::Linux)
        .await
        .expect_err("404 must fail");
    assert!(matches!(err, Error::Network(_)), "got: {err:?}");
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let server = MockServer::start().await;

    // First request fails with 500, subsequent ones serve the binary
    Mock::given(method("GET"))
        .and(path("/latest/linux/codecov"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/linux/codecov"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BINARY_BYTES))
        .with_priority(2)
        .mount(&server)
        .await;
    mount_checksum(&server, &sha256_hex(BINARY_BYTES)).await;

    let dest = TempDir::new().expect("dest dir");
    let mut config = test_config(&server, &dest);
    config.retry.max_attempts = 2;

    let uploader = fetch_uploader(&config, Platform::Linux)
        .await
        .expect("retry should recover from a single 500");
    assert!(uploader.path.exists());
}

#[tokio::test]
async fn pinned_versions_are_fetched_from_versioned_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0.7.3/linux/codecov"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(BINARY_BYTES))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0.7.3/linux/codecov.SHA256SUM"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("{}  codecov\n", sha256_hex(BINARY_BYTES))),
        )
        .mount(&server)
        .await;

    let dest = TempDir::new().expect("dest dir");
    let mut config = test_config(&server, &dest);
    config.uploader.version = "0.7.3".to_string();

    let uploader = fetch_uploader(&config, Platform::Linux)
        .await
        .expect("pinned fetch should succeed");
    assert!(uploader.downloaded);
}
