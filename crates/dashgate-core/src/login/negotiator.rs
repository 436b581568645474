use anyhow::{Context, Result, bail};
use dashgate_types::{
    ChangePasswordRequest, Credentials, LoginOutcome, LoginResponse, ResetPasswordRequest,
    UserSession,
};

use super::redirect::redirect_target;
use crate::api::{ApiResult, Backend, from_value, to_body};
use crate::config::Config;
use crate::notice::Notice;

pub const LOGIN_PATH: &str = "/login";
pub const CHANGE_PASSWORD_PATH: &str = "/api/user/password";
pub const RESET_PASSWORD_PATH: &str = "/api/user/password/reset";

/// Login flow settings.
#[derive(Debug, Clone, Default)]
pub struct NegotiatorOptions {
    pub ldap_enabled: bool,
    pub auth_proxy_enabled: bool,
    /// Application base path ("" or e.g. "/grafana").
    pub base_path: String,
    /// Password reset code from the navigation context.
    pub reset_code: Option<String>,
}

impl NegotiatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ldap_enabled: config.auth.ldap_enabled,
            auth_proxy_enabled: config.auth.auth_proxy_enabled,
            base_path: config.server.base_path().to_string(),
            reset_code: None,
        }
    }

    #[must_use]
    pub fn with_reset_code(mut self, code: Option<String>) -> Self {
        self.reset_code = code.filter(|c| !c.trim().is_empty());
        self
    }

    fn external_auth(&self) -> bool {
        self.ldap_enabled || self.auth_proxy_enabled
    }
}

/// Where the login flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Waiting for input; `error` describes the last failed attempt.
    Idle { error: Option<String> },
    /// A login request is in flight.
    Submitting,
    /// The session limit was hit; one of `sessions` must be revoked.
    ShowSessionPicker { sessions: Vec<UserSession> },
    /// Logged in with the default password; a new one should be chosen.
    ForceSecretChange,
    /// Done; the client should navigate to `target`.
    Redirecting { target: String },
}

/// Classifies a successful `POST /login` response.
///
/// Competing sessions win over everything else. The default-password check
/// is a literal comparison and is skipped when LDAP or proxy auth is active.
pub fn classify_login(
    credentials: &Credentials,
    response: &LoginResponse,
    options: &NegotiatorOptions,
) -> LoginOutcome {
    let sessions = response.competing_sessions();
    if !sessions.is_empty() {
        return LoginOutcome::SessionLimitReached(sessions.to_vec());
    }

    if credentials.uses_default_password() && !options.external_auth() {
        LoginOutcome::MustChangeDefaultSecret
    } else {
        LoginOutcome::Success(response.redirect_url.clone())
    }
}

/// Drives the login state machine against a [`Backend`].
///
/// Every method takes `&mut self`, so at most one request is in flight.
pub struct SessionNegotiator<B> {
    backend: B,
    options: NegotiatorOptions,
    state: LoginState,
    /// Last submitted credentials, reused to resolve a session conflict.
    credentials: Option<Credentials>,
    /// Redirect target from the last admitted login.
    redirect_url: Option<String>,
    notices: Vec<Notice>,
}

impl<B: Backend> SessionNegotiator<B> {
    pub fn new(backend: B, options: NegotiatorOptions) -> Self {
        Self {
            backend,
            options,
            state: LoginState::Idle { error: None },
            credentials: None,
            redirect_url: None,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drains notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Submits `credentials` and transitions according to the outcome.
    ///
    /// Transport and validation failures both land in `Idle` with an error;
    /// they are never retried.
    pub async fn submit_login(&mut self, credentials: Credentials) -> LoginOutcome {
        self.state = LoginState::Submitting;
        tracing::info!(
            user = %credentials.user,
            revoke_session = ?credentials.token_id,
            "submitting login"
        );

        let outcome = match self.post_login(&credentials).await {
            Ok(response) => {
                let outcome = classify_login(&credentials, &response, &self.options);
                if !matches!(outcome, LoginOutcome::SessionLimitReached(_)) {
                    self.redirect_url = response.redirect_url;
                }
                outcome
            }
            Err(err) => {
                tracing::warn!(kind = %err.kind, "login failed: {err}");
                self.notices
                    .push(Notice::warning("Login Failed", err.message.clone()));
                LoginOutcome::Failure(err.message)
            }
        };

        self.credentials = Some(credentials);
        self.apply(&outcome);
        outcome
    }

    /// Retries the last login, asking the server to revoke `session_id`.
    ///
    /// # Errors
    /// Returns an error if no login has been submitted yet.
    pub async fn resolve_session_conflict(&mut self, session_id: i64) -> Result<LoginOutcome> {
        let Some(credentials) = self.credentials.as_ref() else {
            bail!("No login attempt to resume");
        };
        let credentials = credentials.revoking(session_id);
        tracing::info!(session_id, "revoking competing session");
        Ok(self.submit_login(credentials).await)
    }

    /// Replaces the password, then redirects.
    ///
    /// With a reset code in the options the token-based reset endpoint is
    /// used; otherwise the authenticated update endpoint. On failure the
    /// state is left unchanged.
    ///
    /// # Errors
    /// Returns an error if the server rejects the change or is unreachable.
    pub async fn change_secret(&mut self, new_password: &str) -> Result<()> {
        let result = match self.options.reset_code.as_deref() {
            Some(code) => {
                let body = to_body(&ResetPasswordRequest::new(code, new_password))?;
                self.backend.post(RESET_PASSWORD_PATH, &body).await
            }
            None => {
                let body = to_body(&ChangePasswordRequest::from_default(new_password))?;
                self.backend.put(CHANGE_PASSWORD_PATH, &body).await
            }
        };

        if let Err(err) = result {
            tracing::error!(kind = %err.kind, "password change failed: {err}");
            return Err(err).context("Failed to change password");
        }

        tracing::info!("password changed");
        self.redirect();
        Ok(())
    }

    /// Keeps the default password and redirects without contacting the server.
    pub fn skip_secret_change(&mut self) {
        tracing::info!("skipping password change");
        self.redirect();
    }

    async fn post_login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let body = to_body(credentials)?;
        let value = self.backend.post(LOGIN_PATH, &body).await?;
        if value.is_null() {
            return Ok(LoginResponse::default());
        }
        from_value(value)
    }

    fn apply(&mut self, outcome: &LoginOutcome) {
        self.state = match outcome {
            LoginOutcome::Success(_) => LoginState::Redirecting {
                target: self.target(),
            },
            LoginOutcome::SessionLimitReached(sessions) => LoginState::ShowSessionPicker {
                sessions: sessions.clone(),
            },
            LoginOutcome::MustChangeDefaultSecret => LoginState::ForceSecretChange,
            LoginOutcome::Failure(reason) => LoginState::Idle {
                error: Some(reason.clone()),
            },
        };
    }

    fn redirect(&mut self) {
        self.state = LoginState::Redirecting {
            target: self.target(),
        };
    }

    fn target(&self) -> String {
        redirect_target(self.redirect_url.as_deref(), &self.options.base_path)
    }
}
