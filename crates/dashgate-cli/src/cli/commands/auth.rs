//! Login and logout handlers.

use anyhow::{Result, bail};
use dashgate_core::api::Backend;
use dashgate_core::config::Config;
use dashgate_core::logging::mask_secret;
use dashgate_core::login::{LoginState, NegotiatorOptions, SessionNegotiator};
use dashgate_core::session_store::StoredSession;
use dashgate_types::{Credentials, UserSession};

use crate::cli::{Server, prompt};

const LOGOUT_PATH: &str = "/logout";

pub struct LoginArgs {
    pub user: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub code: Option<String>,
}

pub async fn login(server: &Server, config: &Config, args: LoginArgs) -> Result<()> {
    if config.auth.disable_login_form {
        bail!("Password login is disabled for this server ([auth].disable_login_form)");
    }

    let user = match args.user {
        Some(user) => user,
        None => prompt::line(&format!("{}: ", config.auth.login_hint))?,
    };
    if user.trim().is_empty() {
        bail!("User cannot be empty");
    }
    let password = match args.password {
        Some(password) => password,
        None => prompt::password(&format!("{}: ", config.auth.password_hint))?,
    };

    let mut credentials = Credentials::new(user.trim(), password);
    if let Some(email) = args.email {
        credentials = credentials.with_email(email);
    }

    let options = NegotiatorOptions::from_config(config).with_reset_code(args.code);
    let mut negotiator = SessionNegotiator::new(server.connect_anonymous()?, options);
    negotiator.submit_login(credentials).await;

    let target = loop {
        match negotiator.state().clone() {
            LoginState::Redirecting { target } => break target,
            LoginState::Idle { error } => {
                for notice in negotiator.take_notices() {
                    eprintln!("! {notice}");
                }
                bail!(
                    "Login failed: {}",
                    error.as_deref().unwrap_or("invalid username or password")
                );
            }
            LoginState::ShowSessionPicker { sessions } => {
                let session_id = pick_session_to_revoke(&sessions)?;
                negotiator.resolve_session_conflict(session_id).await?;
            }
            LoginState::ForceSecretChange => {
                println!();
                println!("You are using the default password. Choose a new one (empty to skip).");
                let new_password = prompt::password("New password: ")?;
                if new_password.is_empty() {
                    negotiator.skip_secret_change();
                    continue;
                }
                if prompt::password("Confirm new password: ")? != new_password {
                    eprintln!("Passwords do not match.");
                    continue;
                }
                if let Err(err) = negotiator.change_secret(&new_password).await {
                    eprintln!("! Password not changed: {err:#}");
                    continue;
                }
                println!("✓ Password changed");
            }
            LoginState::Submitting => bail!("Login did not complete"),
        }
    };

    println!("✓ Logged in as {} on {}", user.trim(), server.url);
    println!("  Redirect: {target}");

    match negotiator.backend().cookie_header() {
        Some(cookie) => {
            tracing::debug!(cookie = %mask_secret(&cookie), "storing session cookie");
            server
                .store()
                .save(&StoredSession::new(&server.url, user.trim(), cookie))?;
            println!("  Session saved to: {}", server.store().path().display());
        }
        None => {
            tracing::warn!("login succeeded without a session cookie");
            println!("  Server did not issue a session cookie; nothing stored.");
        }
    }

    Ok(())
}

fn pick_session_to_revoke(sessions: &[UserSession]) -> Result<i64> {
    println!();
    println!("Maximum number of sessions reached. Revoke one to continue:");
    for (i, session) in sessions.iter().enumerate() {
        println!(
            "  {}. {} from {} (last seen {}, created {})",
            i + 1,
            session.client_label(),
            session.client_ip,
            session.seen_at,
            session.created_at
        );
    }

    match prompt::choice("Session to revoke (empty cancels): ", sessions.len())? {
        Some(index) => Ok(sessions[index].id),
        None => bail!("Login cancelled"),
    }
}

pub async fn logout(server: &Server) -> Result<()> {
    let Some(session) = server.store().load()?.filter(|s| s.matches(&server.url)) else {
        println!("Not logged in to {} (no session found).", server.url);
        return Ok(());
    };

    let backend = server.connect()?;
    // The server answers with a redirect to the login page; only reachability matters.
    if let Err(err) = backend.get(LOGOUT_PATH, &[]).await {
        tracing::warn!(kind = %err.kind, "server logout failed: {err}");
    }

    server.store().clear()?;
    println!("✓ Logged out {} from {}", session.user, server.url);
    println!("  Session removed from: {}", server.store().path().display());
    Ok(())
}
