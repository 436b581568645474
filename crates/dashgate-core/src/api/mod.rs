//! Remote backend access.
//!
//! Components talk to the server through [`Backend`], a thin JSON
//! request/response abstraction. [`HttpBackend`] is the reqwest
//! implementation used by the CLI; tests substitute in-memory fakes.

mod error;
mod http;

use std::future::Future;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use http::{BackendConfig, HttpBackend};

/// Standard User-Agent header for dashgate API requests.
pub const USER_AGENT: &str = concat!("dashgate/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding the configured server URL.
pub const URL_ENV_VAR: &str = "DASHGATE_URL";

/// JSON-over-HTTP access to the dashboard server.
///
/// Paths are absolute (`/api/...`) and resolved against the backend's base
/// URL. Empty response bodies decode to `Value::Null`.
pub trait Backend: Send + Sync {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = ApiResult<Value>> + Send;

    fn post(&self, path: &str, body: &Value) -> impl Future<Output = ApiResult<Value>> + Send;

    fn put(&self, path: &str, body: &Value) -> impl Future<Output = ApiResult<Value>> + Send;
}

impl<T: Backend> Backend for &T {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = ApiResult<Value>> + Send {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: &Value) -> impl Future<Output = ApiResult<Value>> + Send {
        (**self).post(path, body)
    }

    fn put(&self, path: &str, body: &Value) -> impl Future<Output = ApiResult<Value>> + Send {
        (**self).put(path, body)
    }
}

/// Serializes `body` for a [`Backend`] call.
///
/// # Errors
/// Returns a parse error if `body` cannot be represented as JSON.
pub fn to_body<T: Serialize>(body: &T) -> ApiResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::new(ApiErrorKind::Parse, format!("Failed to encode request: {e}")))
}

/// Decodes a [`Backend`] response into a typed value.
///
/// # Errors
/// Returns a parse error if the value does not match `T`.
pub fn from_value<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::new(ApiErrorKind::Parse, format!("Unexpected response: {e}")))
}

/// Resolves the server base URL with precedence: flag > env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL is not a valid absolute URL.
pub fn resolve_base_url(flag_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    let env_url = std::env::var(URL_ENV_VAR).ok();
    let chosen = [flag_url, env_url.as_deref(), config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(crate::config::Config::DEFAULT_URL);

    validate_url(chosen)?;
    Ok(chosen.trim_end_matches('/').to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid server URL: {url}"))?;
    Ok(())
}
