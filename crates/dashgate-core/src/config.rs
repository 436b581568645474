//! Configuration management for dashgate.
//!
//! Loads configuration from ${DASHGATE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// Embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for dashgate configuration and data files.
    //!
    //! DASHGATE_HOME resolution order:
    //! 1. DASHGATE_HOME environment variable (if set)
    //! 2. ~/.config/dashgate (default)

    use std::path::PathBuf;

    /// Returns the dashgate home directory.
    ///
    /// Falls back to a relative `.dashgate` directory when no home directory
    /// can be determined.
    pub fn dashgate_home() -> PathBuf {
        if let Ok(home) = std::env::var("DASHGATE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".dashgate"),
            |h| h.join(".config").join("dashgate"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        dashgate_home().join("config.toml")
    }

    /// Returns the path to the stored session cookie.
    pub fn session_path() -> PathBuf {
        dashgate_home().join("session.json")
    }
}

/// Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the dashboard server.
    pub url: Option<String>,
    /// Sub-path the application is served under (e.g. "/grafana").
    pub app_sub_url: String,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: Some(Config::DEFAULT_URL.to_string()),
            app_sub_url: String::new(),
            timeout_secs: 0,
        }
    }
}

impl ServerConfig {
    /// Returns the configured URL if set and non-empty.
    pub fn effective_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Base path with surrounding whitespace and trailing slashes removed.
    pub fn base_path(&self) -> &str {
        self.app_sub_url.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.timeout_secs)))
        }
    }
}

/// Server-side authentication features the client must honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub ldap_enabled: bool,
    pub auth_proxy_enabled: bool,
    pub disable_login_form: bool,
    pub login_hint: String,
    pub password_hint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            ldap_enabled: false,
            auth_proxy_enabled: false,
            disable_login_form: false,
            login_hint: "email or username".to_string(),
            password_hint: "password".to_string(),
        }
    }
}

/// Folder picker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldersConfig {
    /// Label of the root folder (id 0).
    pub root_name: String,
    /// Whether the signed-in user may edit in the root folder.
    pub is_editor: bool,
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            root_name: "General".to_string(),
            is_editor: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level or `EnvFilter` directive.
    pub level: String,
    /// Optional log file; stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub folders: FoldersConfig,
    pub log: LogConfig,
}

impl Config {
    pub const DEFAULT_URL: &str = "http://localhost:3000";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        // Parse template as base (preserves comments)
        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}
