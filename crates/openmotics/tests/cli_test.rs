//! Integration tests for the `openmotics` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a network; request flows run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `openmotics` binary with env isolation.
///
/// Clears all `OPENMOTICS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn openmotics_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("openmotics");
    cmd.env("HOME", "/tmp/openmotics-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/openmotics-cli-test-nonexistent")
        .env_remove("OPENMOTICS_PROFILE")
        .env_remove("OPENMOTICS_CONFIG")
        .env_remove("OPENMOTICS_BASE_URL")
        .env_remove("OPENMOTICS_TOKEN")
        .env_remove("OPENMOTICS_CLIENT_SECRET")
        .env_remove("OPENMOTICS_INSTALLATION_ID")
        .env_remove("OPENMOTICS_HOST")
        .env_remove("OPENMOTICS_USERNAME")
        .env_remove("OPENMOTICS_PASSWORD")
        .env_remove("OPENMOTICS_OUTPUT")
        .env_remove("OPENMOTICS_INSECURE")
        .env_remove("OPENMOTICS_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || openmotics_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = openmotics_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    openmotics_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("outputs")
            .and(predicate::str::contains("thermostats"))
            .and(predicate::str::contains("local")),
    );
}

#[test]
fn test_version_flag() {
    openmotics_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("openmotics"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    openmotics_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    openmotics_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_thermostat_mode() {
    let output = openmotics_cmd()
        .args(["thermostats", "mode", "warm"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("heating or cooling"));
}

#[test]
fn test_outputs_list_without_credentials() {
    let output = openmotics_cmd().args(["outputs", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No credentials"));
}

#[test]
fn test_outputs_list_without_installation() {
    let output = openmotics_cmd()
        .args(["--token", "abc", "outputs", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("No installation selected"));
}

#[test]
fn test_local_without_host() {
    let output = openmotics_cmd()
        .args(["local", "--username", "admin", "--password", "pw", "login"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[test]
fn test_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[profiles.home]\ntoken = \"t\"\n").unwrap();

    let output = openmotics_cmd()
        .args(["--config", config.to_str().unwrap(), "-p", "office", "sensors", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("office"));
}

// ── Cloud requests ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_outputs_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/base/installations/5/outputs"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 0, "name": "Vijver", "type": "OUTLET", "capabilities": ["ON_OFF"],
                 "status": {"on": true}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/api/v1.1", server.uri());
    let output = run(args(&[
        "--base-url", &base, "--token", "abc", "-i", "5", "-o", "json-compact", "outputs", "list",
    ]))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(parsed[0]["name"], "Vijver");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_outputs_list_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/base/installations/5/outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 3, "name": "a"}, {"id": 7, "name": "b"}]
        })))
        .mount(&server)
        .await;

    let base = format!("{}/api/v1.1", server.uri());
    let output = run(args(&[
        "--base-url", &base, "--token", "abc", "-i", "5", "-o", "plain", "outputs", "list",
    ]))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3\n7");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_thermostat_mode_posts_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1.1/base/installations/5/thermostats/mode"))
        .and(body_json(json!({"mode": "HEATING"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/api/v1.1", server.uri());
    let output = run(args(&[
        "--base-url", &base, "--token", "abc", "-i", "5", "thermostats", "mode", "heating",
    ]))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_maps_to_auth_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1.1/base/installations"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/api/v1.1", server.uri());
    let output = run(args(&["--base-url", &base, "--token", "bad", "installations", "list"])).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

// ── Local gateway requests ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_local_outputs_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": "t1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_output_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "config": [{"id": 0, "name": "Vijver", "module_type": "D", "type": 255}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_output_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": [{"id": 0, "status": 1, "dimmer": 70}]
        })))
        .mount(&server)
        .await;

    let port = server.address().port().to_string();
    let output = run(args(&[
        "--host", "127.0.0.1", "--port", &port, "--no-tls", "-o", "json", "local", "--username",
        "admin", "--password", "pw", "outputs", "list",
    ]))
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(parsed[0]["output_type"], "LIGHT");
    assert_eq!(parsed[0]["status"]["value"], 70);
}
