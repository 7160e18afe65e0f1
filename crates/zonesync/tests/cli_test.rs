//! Integration tests for the `zonesync` CLI binary.
//!
//! Parsing, help, completions and local commands run without a controller;
//! the controller-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use insta::assert_snapshot;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/wsg/api/public/v11_1";

/// Build a [`Command`] for the `zonesync` binary with env isolation.
///
/// Clears all `ZONESYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn zonesync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("zonesync");
    cmd.env("HOME", "/tmp/zonesync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/zonesync-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/zonesync-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for var in [
        "ZONESYNC_PROFILE",
        "ZONESYNC_CONFIG",
        "ZONESYNC_CONTROLLER",
        "ZONESYNC_USERNAME",
        "ZONESYNC_PASSWORD",
        "ZONESYNC_INSECURE",
        "ZONESYNC_TIMEOUT",
        "ZONESYNC_STORE",
        "ZONESYNC_OUTPUT",
        "ZONESYNC_CREDENTIAL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_owned()
}

/// Flags pointing a command at `server` and a store file under `dir`.
fn controller_args(server: &MockServer, dir: &Path) -> Vec<String> {
    vec![
        "--controller".into(),
        format!("{}{BASE}", server.uri()),
        "--username".into(),
        "admin".into(),
        "--password".into(),
        "s3cret".into(),
        "--store".into(),
        dir.join("clients.json").display().to_string(),
        "--output".into(),
        "json-compact".into(),
    ]
}

/// Run the binary off the async runtime so wiremock keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || zonesync_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn p(suffix: &str) -> String {
    format!("{BASE}/{suffix}")
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(p("session")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "JSESSIONID=cli1; Path=/wsg; Secure")
                .set_body_json(json!({ "controllerVersion": "6.1.2.0.113" })),
        )
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(p("session")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn mount_ticket(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(p("serviceTicket")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "controllerVersion": "6.1.2.0.113",
            "serviceTicket": "ST-7-cli"
        })))
        .mount(server)
        .await;
}

async fn mount_clients(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(p("query/client")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 2,
            "hasMore": false,
            "firstIndex": 0,
            "list": [
                {
                    "clientMac": "AA:BB:CC:11:22:33",
                    "hostname": "laptop",
                    "ipAddress": "10.1.1.20",
                    "ssid": "campus",
                    "txBytes": 1000,
                    "rxBytes": 500,
                    "status": "AUTHORIZED"
                },
                {
                    "clientMac": "aa:bb:cc:44:55:66",
                    "hostname": "printer",
                    "ssid": "iot",
                    "status": "UNAUTHORIZED"
                }
            ]
        })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = zonesync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    zonesync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("SmartZone")
            .and(predicate::str::contains("ticket"))
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("flow")),
    );
}

#[test]
fn test_version_flag() {
    zonesync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zonesync"));
}

#[test]
fn test_completions_zsh() {
    zonesync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    zonesync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = zonesync_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_clients_fetch_without_controller() {
    let output = zonesync_cmd()
        .args(["--output", "json-compact", "clients", "fetch"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No controller configured");
    assert!(String::from_utf8_lossy(&output.stderr).contains("ZONESYNC_CONTROLLER"));
}

#[test]
fn test_unknown_profile() {
    zonesync_cmd()
        .args(["--profile", "nope", "zones"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_profile_with_two_trust_modes_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    std::fs::write(
        &cfg,
        r#"
[profiles.default]
controller = "https://sz.example:8443/wsg/api/public/v11_1"
username = "admin"
password = "pw"
ca_cert = "/etc/zonesync/ca.pem"
insecure = true
"#,
    )
    .unwrap();

    zonesync_cmd()
        .args(["--config", cfg.to_str().unwrap(), "-o", "json-compact", "zones"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Invalid value for insecure"));
}

#[test]
fn test_bulk_disconnect_needs_targets() {
    zonesync_cmd()
        .args(["clients", "bulk-disconnect"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CLIENT_MAC@AP_MAC"));
}

#[test]
fn test_invalid_output_format() {
    let output = zonesync_cmd()
        .args(["--output", "invalid", "store", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    zonesync_cmd()
        .args(["--config", "/etc/zonesync/test.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/zonesync/test.toml"));
}

#[test]
fn test_config_show_masks_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    std::fs::write(
        &cfg,
        r#"
[profiles.default]
controller = "https://sz.example:8443/wsg/api/public/v11_1"
username = "admin"
password = "hunter2"
"#,
    )
    .unwrap();

    zonesync_cmd()
        .args(["--config", cfg.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("********")
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("sz.example")),
        );
}

// ── Local store ─────────────────────────────────────────────────────

#[test]
fn test_store_list_empty_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("clients.json");
    let output = zonesync_cmd()
        .args(["--store", store.to_str().unwrap(), "store", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_snapshot!(stdout_of(&output), @r#"
    {
      "success": true,
      "clients": [],
      "pagination": {
        "total": 0,
        "page": 1,
        "limit": 20,
        "total_pages": 0
      }
    }
    "#);
}

#[test]
fn test_store_get_missing_client() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("clients.json");
    let output = zonesync_cmd()
        .args([
            "--store",
            store.to_str().unwrap(),
            "-o",
            "json-compact",
            "store",
            "get",
            "AA-BB-CC-DD-EE-FF",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert_snapshot!(
        stdout_of(&output),
        @r#"{"success":false,"message":"client 'aa:bb:cc:dd:ee:ff' not found"}"#
    );
}

#[test]
fn test_store_rejects_page_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("clients.json");
    zonesync_cmd()
        .args(["--store", store.to_str().unwrap(), "store", "list", "--page", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_corrupt_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("clients.json");
    std::fs::write(&store, "{ not json").unwrap();
    zonesync_cmd()
        .args(["--store", store.to_str().unwrap(), "store", "list"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Store error"));
}

// ── Against a controller ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_ticket_create_prints_ticket() {
    let server = MockServer::start().await;
    mount_ticket(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.extend(["ticket".into(), "create".into()]);
    let output = run(args).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_snapshot!(stdout_of(&output), @r#"{"success":true,"ticket":"ST-7-cli"}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_sync_then_query_store() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_clients(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.extend(["clients".into(), "fetch".into(), "--sync".into()]);
    let output = run(args.clone()).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["inserted"], 2);
    assert_eq!(body["result"]["skipped"], 0);
    assert!(dir.path().join("clients.json").exists());

    // A second sync updates instead of inserting.
    let output = run(args).await;
    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["result"]["inserted"], 0);
    assert_eq!(body["result"]["updated"], 2);

    // The store answers without the controller.
    let mut args = controller_args(&server, dir.path());
    args.extend(["store".into(), "list".into(), "--search".into(), "LAPTOP".into()]);
    let output = run(args).await;
    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["clients"][0]["mac"], "aa:bb:cc:11:22:33");
    assert_eq!(body["clients"][0]["total_bytes"], 1500);
    assert_eq!(body["clients"][0]["online"], true);

    let mut args = controller_args(&server, dir.path());
    args.extend(["store".into(), "list".into(), "--status".into(), "unauthorized".into()]);
    let output = run(args).await;
    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["clients"][0]["hostname"], "printer");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_with_explicit_ticket_skips_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(p("session")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(p("query/client")))
        .and(query_param("serviceTicket", "ST-1-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "clientMac": "aa:bb:cc:11:22:33" }
        ])))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.extend([
        "clients".into(),
        "fetch".into(),
        "--credential".into(),
        "ST-1-abc".into(),
    ]);
    let output = run(args).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["clients"][0]["clientMac"], "aa:bb:cc:11:22:33");
    assert!(!dir.path().join("clients.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(p("session")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Login failed", "errorCode": 202
        })))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.push("zones".into());
    let output = run(args).await;

    assert_eq!(output.status.code(), Some(3));
    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Login failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_posts_normalized_target() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path(p("clients/disconnect")))
        .and(header("cookie", "JSESSIONID=cli1"))
        .and(wiremock::matchers::body_json(json!({
            "mac": "aa:bb:cc:11:22:33",
            "apMac": "00:11:22:33:44:55"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.extend([
        "clients".into(),
        "disconnect".into(),
        "--mac".into(),
        "AA-BB-CC-11-22-33".into(),
        "--ap-mac".into(),
        "00:11:22:33:44:55".into(),
    ]);
    let output = run(args).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_snapshot!(
        stdout_of(&output),
        @r#"{"success":true,"message":"Disconnected aa:bb:cc:11:22:33"}"#
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_flow_runs_every_step() {
    let server = MockServer::start().await;
    mount_ticket(&server).await;
    mount_login(&server).await;
    mount_clients(&server).await;
    Mock::given(method("GET"))
        .and(path(p("session")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpId": "cp-1", "domainId": "8b2081d5", "adminId": "a-1",
            "clientIp": "10.0.0.9", "apiVersions": ["v11_1"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(p("rkszones")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalCount": 1, "hasMore": false, "firstIndex": 0,
            "list": [{ "id": "z-1", "name": "Campus" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(p("serviceTicket")))
        .and(query_param("serviceTicket", "ST-7-cli"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.push("flow".into());
    let output = run(args).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(body["message"], "Flow completed");
    assert_eq!(body["controllerVersion"], "6.1.2.0.113");
    assert_eq!(body["zoneCount"], 1);
    assert_eq!(body["clientCount"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_ticks() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_clients(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = controller_args(&server, dir.path());
    args.extend([
        "watch".into(),
        "--ticks".into(),
        "2".into(),
        "--interval".into(),
        "1".into(),
    ]);
    let output = run(args).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["tick"], 0);
    assert_eq!(lines[1]["tick"], 1);
    assert_eq!(lines[0]["connection_id"], lines[1]["connection_id"]);
    assert_eq!(lines[1]["result"]["updated"], 2);
}
