//! Tracing subscriber setup.
//!
//! Filter resolution order:
//! 1. `DASHGATE_LOG` environment variable (if set and valid)
//! 2. `[log].level` from config
//! 3. `warn`

use std::fs;
use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LogConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "DASHGATE_LOG";

/// Builds the effective filter for `config`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber.
///
/// Logs go to stderr, or to `config.file` through a non-blocking writer.
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(config);

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);

        let fmt_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(filter);
        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .context("Failed to install log subscriber")?;

        return Ok(Some(guard));
    }

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(filter);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(None)
}

/// Masks a secret for display, keeping only a short prefix.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_hides_short_values() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("12345678"), "****");
    }

    #[test]
    fn test_mask_secret_keeps_prefix() {
        assert_eq!(mask_secret("grafana_session=abcdef"), "graf…");
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LogConfig {
            level: "not a [valid filter".to_string(),
            file: None,
        };
        // Must not panic; falls back to "warn".
        let _ = env_filter(&config);
    }
}
