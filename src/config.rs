//! Configuration file handling.
//!
//! This module provides loading and saving of xscan configuration from a
//! TOML file. The loaded [`Config`] is passed explicitly to every client;
//! nothing reads it from global state.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/xscan/config.toml`
//! - macOS: `~/Library/Application Support/xscan/config.toml`
//! - Windows: `%APPDATA%\xscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! is_ci_run = false
//!
//! [server]
//! url = "https://acme.jfrog.io"
//! access_token = "eyJ2ZXIiOi..."
//!
//! [http]
//! retries = 5
//! retry_delay_ms = 1000
//! connect_timeout_ms = 60000
//!
//! [plugin]
//! name = "jfrog-idea-plugin"
//! version = "2.4.0"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of attempts per logical request.
pub const DEFAULT_RETRIES: u32 = 5;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 60_000;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the service lives and how to authenticate to it.
    pub server: ServerConfig,

    /// Retry and timeout settings for every request.
    pub http: HttpSettings,

    /// Identity of the calling plugin, reported in every event.
    pub plugin: PluginInfo,

    /// Whether the scan runs inside a CI pipeline.
    ///
    /// Default: false
    pub is_ci_run: bool,
}

/// Server URL and credentials.
///
/// When both an access token and a username are present, the token wins.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base platform URL, without the `/xsc` suffix.
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Username reported in events; empty when only a token is configured.
    pub fn username_or_empty(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Retry and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Attempts per request, including the first one.
    ///
    /// Default: 5
    pub retries: u32,

    /// Fixed delay between attempts, in milliseconds.
    ///
    /// Default: 1000
    pub retry_delay_ms: u64,

    /// Connect timeout, in milliseconds.
    ///
    /// Default: 60000
    pub connect_timeout_ms: u64,
}

impl HttpSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

/// Identity strings of the calling plugin. Treated as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    /// Sent as the `User-Agent` product token and as `plugin_name`.
    pub name: String,
    pub version: String,
    pub product_version: String,
    pub analyzer_manager_version: String,
}

impl PluginInfo {
    /// `<name>/<version>`
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for PluginInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            product_version: "3.6.4".to_string(),
            analyzer_manager_version: String::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, falling back to defaults
    /// when it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("xscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.http.retries, 5);
        assert_eq!(config.http.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.http.connect_timeout(), Duration::from_secs(60));
        assert_eq!(config.plugin.product_version, "3.6.4");
        assert!(!config.is_ci_run);
        assert!(config.server.url.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "https://acme.jfrog.io"
            access_token = "tok"

            [http]
            retries = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.server.url, "https://acme.jfrog.io");
        assert_eq!(config.server.access_token.as_deref(), Some("tok"));
        assert_eq!(config.server.username, None);
        assert_eq!(config.http.retries, 2);
        assert_eq!(config.http.retry_delay_ms, DEFAULT_RETRY_DELAY_MS);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server = ServerConfig::new("https://acme.jfrog.io").with_basic_auth("user", "pass");
        config.is_ci_run = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.url, "https://acme.jfrog.io");
        assert_eq!(loaded.server.username.as_deref(), Some("user"));
        assert_eq!(loaded.server.password.as_deref(), Some("pass"));
        assert!(loaded.is_ci_run);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.http.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let server = ServerConfig::new("https://acme.jfrog.io")
            .with_basic_auth("user", "hunter2")
            .with_access_token("secret-token");
        let debug = format!("{:?}", server);

        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_user_agent() {
        let plugin = PluginInfo {
            name: "jfrog-idea-plugin".to_string(),
            version: "2.4.0".to_string(),
            ..PluginInfo::default()
        };
        assert_eq!(plugin.user_agent(), "jfrog-idea-plugin/2.4.0");
    }
}
