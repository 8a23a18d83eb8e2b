//! End-to-end CLI tests for the luscious binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use support::{GRAPHQL_PATH, album_payload, envelope, mount_media, mount_picture_page};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn luscious() -> Command {
    let mut cmd = Command::cargo_bin("luscious").expect("binary should build");
    // Keep tests independent of any user config and log settings.
    cmd.env("XDG_CONFIG_HOME", "/nonexistent-luscious-test")
        .env("HOME", "/nonexistent-luscious-test")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    luscious()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download albums and videos"));
}

#[test]
fn test_binary_version_displays_version() {
    luscious()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("luscious"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    luscious().assert().failure();
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    luscious()
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_unknown_video_quality() {
    luscious()
        .args(["video", "1", "--quality", "480"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("480"));
}

#[test]
fn test_binary_missing_config_file_is_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let missing = temp_dir.path().join("absent.toml");
    luscious()
        .args(["random", "--config"])
        .arg(&missing)
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_prints_ids_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("AlbumList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "album",
            "list",
            json!({
                "info": {"page": 1, "total_pages": 2, "total_items": 3},
                "items": [{"id": "101"}, {"id": "102"}]
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        luscious()
            .args(["search", "tentacles", "-r", "0", "--base-url", &uri])
            .output()
    })
    .await
    .expect("join")
    .expect("run binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("page 1/2 (3 results)"), "{stdout}");
    assert!(stdout.contains("101\n102"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_album_download_writes_files_under_output() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("getAlbumInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "album",
            "get",
            album_payload(300, "Cli Album", false, 1),
        )))
        .mount(&server)
        .await;
    let urls = vec![format!("{}/media/only.jpg", server.uri())];
    mount_picture_page(&server, 1, 1, &urls, 1).await;
    mount_media(&server, "/media/only.jpg", "image/jpeg", b"img", 1).await;

    let uri = server.uri();
    let out = temp_dir.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        luscious()
            .args(["album", "300", "-r", "0", "--base-url", &uri, "-o"])
            .arg(&out)
            .output()
    })
    .await
    .expect("join")
    .expect("run binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 downloaded"), "{stdout}");
    assert!(temp_dir.path().join("Cli Album").join("only.jpg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_album_not_found_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "album",
            "get",
            json!({"errors": [{"code": 404, "message": "Album not found"}]}),
        )))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        luscious()
            .args(["album", "999", "--info", "-r", "0", "--base-url", &uri])
            .output()
    })
    .await
    .expect("join")
    .expect("run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not load album '999'"), "{stderr}");
}
