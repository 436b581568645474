//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::json;
use wiremock::MockServer;

pub const SESSION_COOKIE: &str = "grafana_session=abc123";

/// `dashgate` wired to a temp home and the mock server.
pub fn dashgate(home: &Path, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dashgate");
    cmd.env("DASHGATE_HOME", home)
        .env("DASHGATE_URL", server.uri())
        .env("DASHGATE_BLOCK_REAL_API", "1")
        .env_remove("DASHGATE_PASSWORD")
        .env_remove("DASHGATE_LOG");
    cmd
}

/// Writes a stored session for `server` into `home`.
pub fn write_session(home: &Path, server: &MockServer) {
    let session = json!({
        "server": server.uri(),
        "user": "alice",
        "cookie": SESSION_COOKIE,
        "saved_at": "2026-01-01T00:00:00Z"
    });
    fs::write(
        home.join("session.json"),
        serde_json::to_string_pretty(&session).unwrap(),
    )
    .unwrap();
}

/// Writes `contents` as the config file in `home`.
pub fn write_config(home: &Path, contents: &str) {
    fs::write(home.join("config.toml"), contents).unwrap();
}
