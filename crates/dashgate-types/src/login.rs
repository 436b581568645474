//! Login request/response payloads and the login outcome.

use serde::{Deserialize, Serialize};

/// Sentinel password of freshly provisioned accounts.
///
/// A successful login with exactly this password (and no external auth)
/// asks the user to pick a new one.
pub const DEFAULT_PASSWORD: &str = "admin";

/// Credentials submitted to `POST /login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    /// Competing session the server should revoke before admitting this login.
    #[serde(rename = "tokenId", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<i64>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Returns a copy that asks the server to revoke `session_id`.
    #[must_use]
    pub fn revoking(&self, session_id: i64) -> Self {
        Self {
            token_id: Some(session_id),
            ..self.clone()
        }
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_PASSWORD
    }
}

/// An authenticated session already held by the user on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub id: i64,
    #[serde(default)]
    pub seen_at: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub os_version: String,
}

impl UserSession {
    /// "Chrome on Linux 6.1" style label.
    pub fn client_label(&self) -> String {
        let os = format!("{} {}", self.os, self.os_version);
        format!("{} on {}", self.browser, os.trim())
    }
}

/// Body of a successful `POST /login` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Competing sessions, present when the concurrent-session limit is hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<UserSession>>,
}

impl LoginResponse {
    /// Competing sessions, empty when the login was admitted.
    pub fn competing_sessions(&self) -> &[UserSession] {
        self.tokens.as_deref().unwrap_or_default()
    }
}

/// Result of a single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Admitted; carries the server redirect target, if any.
    Success(Option<String>),
    /// Admitted only after one of these sessions is revoked.
    SessionLimitReached(Vec<UserSession>),
    /// Admitted with the default password; a new one should be chosen.
    MustChangeDefaultSecret,
    /// Rejected or unreachable.
    Failure(String),
}

/// Body of `PUT /api/user/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub confirm_new: String,
    pub old_password: String,
}

impl ChangePasswordRequest {
    /// Replaces the default password with `password`.
    pub fn from_default(password: &str) -> Self {
        Self {
            new_password: password.to_string(),
            confirm_new: password.to_string(),
            old_password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Body of `POST /api/user/password/reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordRequest {
    pub fn new(code: &str, password: &str) -> Self {
        Self {
            code: code.to_string(),
            new_password: password.to_string(),
            confirm_password: password.to_string(),
        }
    }
}
