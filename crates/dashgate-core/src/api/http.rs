use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;

use super::{ApiError, ApiErrorKind, ApiResult, Backend, USER_AGENT};
use crate::config::Config;

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Server root, without trailing slash.
    pub base_url: String,
    pub timeout: Option<Duration>,
    /// Previously stored `Cookie` header value.
    pub cookie: Option<String>,
}

/// reqwest-backed [`Backend`] with a cookie jar.
///
/// Cookies set by the server (notably the session cookie issued by
/// `POST /login`) are replayed on later requests and can be read back with
/// [`HttpBackend::cookie_header`] for persistence. Expiry, path and domain
/// rules are enforced by the jar.
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpBackend {
    /// Creates a backend for `config.base_url`.
    ///
    /// When `DASHGATE_BLOCK_REAL_API=1` is set, refuses the built-in default
    /// URL so test harnesses cannot reach a real server by accident.
    ///
    /// # Errors
    /// Returns an error if the guard trips, the URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self> {
        if std::env::var("DASHGATE_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == Config::DEFAULT_URL
        {
            anyhow::bail!(
                "DASHGATE_BLOCK_REAL_API=1 but trying to use the default server {}. \
                 Set DASHGATE_URL to a mock server.",
                config.base_url
            );
        }

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid server URL: {}", config.base_url))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = config.cookie.as_deref() {
            for pair in cookie.split(';').map(str::trim).filter(|p| p.contains('=')) {
                jar.add_cookie_str(pair, &base_url);
            }
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http,
            jar,
        })
    }

    /// Cookies the jar would send to the server root, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .filter(|value| !value.is_empty())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, method: &'static str, path: &str, builder: RequestBuilder) -> ApiResult<Value> {
        tracing::debug!(method, path, "sending request");

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;
        tracing::debug!(method, path, status = status.as_u16(), "received response");

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            ApiError::new(
                ApiErrorKind::Parse,
                format!("Invalid JSON from {method} {path}: {e}"),
            )
        })
    }
}

impl Backend for HttpBackend {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        let builder = self.request(Method::GET, path).query(query);
        self.send("GET", path, builder).await
    }

    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let builder = self.request(Method::POST, path).json(body);
        self.send("POST", path, builder).await
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        let builder = self.request(Method::PUT, path).json(body);
        self.send("PUT", path, builder).await
    }
}
