//! Integration tests for the `aistrip` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without any service; the end-to-end cases point `--base-url` at a
//! wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const ISOLATED_HOME: &str = "/tmp/aistrip-cli-test-nonexistent";

/// Build a [`Command`] for the `aistrip` binary with env isolation.
///
/// Clears all `AISTRIP_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn aistrip_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aistrip");
    cmd.env("HOME", ISOLATED_HOME)
        .env("XDG_CONFIG_HOME", ISOLATED_HOME)
        .env("XDG_DATA_HOME", ISOLATED_HOME)
        .env_remove("RUST_LOG")
        .env_remove("AISTRIP_KEY")
        .env_remove("AISTRIP_KEY_ENV")
        .env_remove("AISTRIP_NAME")
        .env_remove("AISTRIP_CONFIG")
        .env_remove("AISTRIP_REGISTRY")
        .env_remove("AISTRIP_OUTPUT")
        .env_remove("AISTRIP_BASE_URL")
        .env_remove("AISTRIP_TIMEOUT")
        .env_remove("AISTRIP_REFRESH_INTERVAL");
    cmd
}

/// `aistrip_cmd` wired to a mock service and a private registry file.
fn service_cmd(server_uri: &str, registry: &Path) -> assert_cmd::Command {
    let mut cmd = aistrip_cmd();
    cmd.args(["--key", "test-key", "--base-url"])
        .arg(format!("{server_uri}/api/fa2"))
        .arg("--registry")
        .arg(registry);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/fa2/dev/all"))
        .and(header("Authorization", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "data": [
                { "outletId": "x1", "outletName": "Lamp", "deviceType": "AiStrip" },
                { "outletId": "x2", "outletName": "Fan", "deviceType": "Other" }
            ]
        })))
        .mount(server)
        .await;
}

/// Run a blocking command off the async test thread.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = aistrip_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    aistrip_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("AiStrip")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("outlet")),
    );
}

#[test]
fn test_version_flag() {
    aistrip_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aistrip"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    aistrip_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    aistrip_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = aistrip_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_without_key_fails_with_auth_code() {
    let output = aistrip_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("No key configured"), "unexpected output:\n{text}");
}

#[test]
fn test_invalid_power_state() {
    let output = aistrip_cmd()
        .args(["--key", "k", "outlet", "set", "x1", "maybe"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("possible values") || text.contains("invalid value"));
}

#[test]
fn test_invalid_output_format() {
    let output = aistrip_cmd()
        .args(["--output", "invalid", "devices"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_follows_flag() {
    aistrip_cmd()
        .args(["--config", "/tmp/aistrip-test/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/aistrip-test/custom.toml"));
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    aistrip_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("name = \"AiStrip\"")
                .and(predicate::str::contains("asia-east1.tiscservice.com")),
        );
}

#[test]
fn test_config_show_redacts_key() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    std::fs::write(&cfg, "name = \"Den\"\nkey = \"hunter2\"\n").unwrap();

    aistrip_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Den")
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_accessories_with_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    aistrip_cmd()
        .arg("--registry")
        .arg(dir.path().join("accessories.json"))
        .args(["-o", "json", "accessories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

// ── Against a mock service ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_lists_supported_strips_as_json() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = service_cmd(&server.uri(), &dir.path().join("accessories.json"));
    cmd.args(["-o", "json", "devices"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices, json!([{ "deviceId": "x1", "deviceName": "Lamp" }]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_persists_registry() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("accessories.json");

    let mut cmd = service_cmd(&server.uri(), &registry);
    cmd.arg("sync");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 added, 0 updated, 0 removed"));

    let mut cmd = service_cmd(&server.uri(), &registry);
    cmd.args(["-o", "json", "sync"]);
    let output = run(cmd).await;
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["added"], json!([]));
    assert_eq!(summary["updated"][0]["deviceId"], "x1");

    let mut cmd = aistrip_cmd();
    cmd.arg("--registry").arg(&registry).args(["-o", "plain", "accessories"]);
    let output = run(cmd).await;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_failure_exits_with_connection_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/fa2/dev/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": false })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = service_cmd(&server.uri(), &dir.path().join("accessories.json"));
    cmd.arg("sync");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("check your key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_outlet_set_by_name() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/fa2/dev/x1/control"))
        .and(body_json(json!({ "state": 1, "kind": "ios" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": true })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = service_cmd(&server.uri(), &dir.path().join("accessories.json"));
    cmd.args(["-o", "plain", "outlet", "set", "lamp", "on"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "on");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_outlet_get_unknown_device() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = service_cmd(&server.uri(), &dir.path().join("accessories.json"));
    cmd.args(["outlet", "get", "x2"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
}
