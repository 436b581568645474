//! Integration tests for login and logout against a mock server.

mod fixtures;

use std::fs;

use fixtures::{SESSION_COOKIE, dashgate, write_config, write_session};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn logged_in(redirect: Option<&str>) -> ResponseTemplate {
    let body = match redirect {
        Some(url) => json!({"message": "Logged in", "redirectUrl": url}),
        None => json!({"message": "Logged in"}),
    };
    ResponseTemplate::new(200)
        .insert_header("set-cookie", "grafana_session=abc123; Path=/; HttpOnly")
        .set_body_json(body)
}

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_partial_json(json!({"user": "alice", "password": "s3cret"})))
        .respond_with(logged_in(Some("/d/abc")))
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice"))
        .stdout(predicate::str::contains("Redirect: /d/abc"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(home.path().join("session.json")).unwrap())
            .unwrap();
    assert_eq!(stored["cookie"], SESSION_COOKIE);
    assert_eq!(stored["user"], "alice");
    assert_eq!(stored["server"], server.uri());
}

#[tokio::test]
async fn test_login_redirect_respects_sub_url() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    write_config(home.path(), "[server]\napp_sub_url = \"/grafana/\"\n");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Redirect: /grafana/"));
}

#[tokio::test]
async fn test_login_failure_reports_server_message() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid username or password"})),
        )
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login Failed: Invalid username or password"))
        .stderr(predicate::str::contains("Login failed"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_session_limit_revokes_chosen_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_partial_json(json!({"tokenId": 12})))
        .respond_with(logged_in(Some("/")))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Maximum sessions reached",
            "tokens": [
                {"id": 11, "seenAt": "2 hours ago", "createdAt": "2026-10-01", "clientIp": "10.0.0.1",
                 "browser": "Firefox", "os": "Linux", "osVersion": ""},
                {"id": 12, "seenAt": "3 days ago", "createdAt": "2026-09-20", "clientIp": "10.0.0.2",
                 "browser": "Chrome", "os": "macOS", "osVersion": "14"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "s3cret"])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Maximum number of sessions reached"))
        .stdout(predicate::str::contains("Chrome on macOS 14 from 10.0.0.2"))
        .stdout(predicate::str::contains("Logged in as alice"));
}

#[tokio::test]
async fn test_login_session_picker_cancel() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": [{"id": 11, "browser": "Firefox", "os": "Linux"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "s3cret"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login cancelled"));
}

#[tokio::test]
async fn test_login_default_password_forces_change() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/user/password"))
        .and(body_json(json!({
            "newPassword": "n3w-secret",
            "confirmNew": "n3w-secret",
            "oldPassword": "admin"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User password changed"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user/password/reset"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "admin", "--password", "admin"])
        .write_stdin("n3w-secret\nn3w-secret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("default password"))
        .stdout(predicate::str::contains("Password changed"))
        .stdout(predicate::str::contains("Logged in as admin"));
}

#[tokio::test]
async fn test_login_default_password_change_can_be_skipped() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/user/password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "admin", "--password", "admin"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as admin"));
}

#[tokio::test]
async fn test_login_prompted_password_is_sent_verbatim() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_partial_json(json!({"user": "admin", "password": "admin "})))
        .respond_with(logged_in(None))
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "admin"])
        .write_stdin("admin \n")
        .assert()
        .success()
        .stdout(predicate::str::contains("default password").not())
        .stdout(predicate::str::contains("Logged in as admin"));
}

#[tokio::test]
async fn test_login_rejected_password_change_can_be_retried_or_skipped() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/user/password"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "New password is too short"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "admin", "--password", "admin"])
        .write_stdin("short\nshort\n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Password not changed"))
        .stderr(predicate::str::contains("New password is too short"))
        .stdout(predicate::str::contains("Password changed").not())
        .stdout(predicate::str::contains("Logged in as admin"));

    assert!(home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_login_reset_code_uses_reset_endpoint() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user/password/reset"))
        .and(body_json(json!({
            "code": "reset-123",
            "newPassword": "n3w-secret",
            "confirmPassword": "n3w-secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Password changed"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/user/password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args([
            "login", "--user", "admin", "--password", "admin", "--code", "reset-123",
        ])
        .write_stdin("n3w-secret\nn3w-secret\n")
        .assert()
        .success();
}

#[tokio::test]
async fn test_login_ldap_skips_password_change() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    write_config(home.path(), "[auth]\nldap_enabled = true\n");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "admin", "--password", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default password").not())
        .stdout(predicate::str::contains("Logged in as admin"));
}

#[tokio::test]
async fn test_login_form_disabled() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    write_config(home.path(), "[auth]\ndisable_login_form = true\n");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(logged_in(None))
        .expect(0)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .args(["login", "--user", "alice", "--password", "s3cret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    write_session(home.path(), &server);

    Mock::given(method("GET"))
        .and(path("/logout"))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    dashgate(home.path(), &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out alice"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_logout_without_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    dashgate(home.path(), &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}
