//! Configuration management for the manga browser.
//!
//! Settings are read from an optional TOML file. Every section falls back to
//! the built-in defaults, so an empty or missing file yields a working setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Jikan API v4 base URL
pub const JIKAN_API_BASE: &str = "https://api.jikan.moe/v4";

/// Number of cards requested per page
pub const MANGA_PER_PAGE: u32 = 24;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate-limit retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Feed defaults
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output (stderr)
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Items requested per page
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Backoff growth between rate-limited attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry
    Fixed,
    /// Delay doubles per retry, capped at `max_delay_ms`
    Exponential,
}

/// Rate-limit (HTTP 429) retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay before the first retry in milliseconds
    pub delay_ms: u64,

    /// Maximum number of attempts per fetch cycle (None = unlimited)
    pub max_attempts: Option<u32>,

    /// Backoff growth
    pub backoff: BackoffKind,

    /// Upper bound for exponential backoff in milliseconds
    pub max_delay_ms: u64,
}

/// Default filter values for both feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    /// Initial sort selection of the top feed
    pub top_sort: String,

    /// Initial `order_by` of the browse feed
    pub browse_order_by: String,

    /// Initial sort direction of the browse feed
    pub browse_sort: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: JIKAN_API_BASE.to_string(),
            page_size: MANGA_PER_PAGE,
            timeout_secs: 30,
            user_agent: concat!("manga-browser/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            max_attempts: None,
            backoff: BackoffKind::Fixed,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            top_sort: "bypopularity".to_string(),
            browse_order_by: "score".to_string(),
            browse_sort: "desc".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration saved");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.api.page_size, 24);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.retry.max_attempts, None);
        assert_eq!(config.retry.backoff, BackoffKind::Fixed);
        assert_eq!(config.feeds.top_sort, "bypopularity");
        assert_eq!(config.feeds.browse_order_by, "score");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original = Config::default();
        original.retry.max_attempts = Some(5);
        original.retry.backoff = BackoffKind::Exponential;
        original.save(&config_path)?;

        let loaded = Config::from_file(&config_path)?;
        assert_eq!(loaded.api.base_url, original.api.base_url);
        assert_eq!(loaded.retry.max_attempts, Some(5));
        assert_eq!(loaded.retry.backoff, BackoffKind::Exponential);

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[api]\npage_size = 10\n")?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.api.page_size, 10);
        assert_eq!(config.api.base_url, JIKAN_API_BASE);
        assert_eq!(config.retry.delay_ms, 1000);
        assert_eq!(config.feeds.browse_sort, "desc");

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.logging.default_level, "info");
    }

    #[test]
    fn test_invalid_config_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[retry]\nbackoff = \"sideways\"\n")?;

        assert!(Config::from_file(&config_path).is_err());
        Ok(())
    }
}
