//! Configuration Module
//!
//! Handles configuration loading, validation, and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Attachment cap enforced before upload: 2MB
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 2 * 1024 * 1024;

/// Production booking server
pub const PRODUCTION_BASE_URL: &str = "https://api.tnlbeauty.com";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Booking server connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Draft persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Booking server base URL (default: http://localhost:3000)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout. Unset means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Largest inspiration image accepted, in bytes
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: usize,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_attachment_bytes() -> usize {
    DEFAULT_MAX_ATTACHMENT_BYTES
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the draft booking file
    #[serde(default = "default_draft_path")]
    pub draft_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            draft_path: default_draft_path(),
        }
    }
}

fn default_draft_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tnl-booking")
        .join("draft.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/tnl-booking/config.toml
    /// 3. Local config: ./tnl-booking.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(&system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(&local_config_path)?;
        }

        config = Self::apply_env_overrides(config)?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply
    /// environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::merge_from_file(path)?;
        Self::apply_env_overrides(config)
    }

    /// Get the system config path: ~/.config/tnl-booking/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tnl-booking").join("config.toml"))
    }

    /// Get the local config path: ./tnl-booking.toml
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("./tnl-booking.toml")
    }

    /// Parse a TOML file. Sections the file leaves out take their defaults,
    /// so a later file replaces an earlier one section by section.
    fn merge_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn apply_env_overrides(config: Self) -> Result<Self> {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply `TNL_BOOKING_*` overrides read through `lookup`
    fn apply_overrides_from(mut config: Self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("TNL_BOOKING_API_URL") {
            config.api.base_url = url;
        }

        if let Some(path) = lookup("TNL_BOOKING_DRAFT_PATH") {
            config.storage.draft_path = PathBuf::from(path);
        }

        if let Some(level) = lookup("TNL_BOOKING_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(timeout) = lookup("TNL_BOOKING_TIMEOUT_SECS") {
            let secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid TNL_BOOKING_TIMEOUT_SECS: {:?}", timeout))?;
            config.api.timeout_secs = Some(secs);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }

        if self.api.max_attachment_bytes == 0 {
            anyhow::bail!("api.max_attachment_bytes must be greater than zero");
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                VALID_LOG_LEVELS
            );
        }

        if let Some(parent) = self.storage.draft_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tracing::debug!("Draft directory does not exist, will be created: {:?}", parent);
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.max_attachment_bytes, 2 * 1024 * 1024);
        assert!(config.api.timeout_secs.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.draft_path.ends_with("tnl-booking/draft.json"));
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_attachment_cap() {
        let mut config = Config::default();
        config.api.max_attachment_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
[api]
base_url = "https://api.tnlbeauty.com"
timeout_secs = 15

[logging]
level = "debug"
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::merge_from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, PRODUCTION_BASE_URL);
        assert_eq!(config.api.timeout_secs, Some(15));
        assert_eq!(config.api.max_attachment_bytes, DEFAULT_MAX_ATTACHMENT_BYTES);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[api\nbase_url = ").unwrap();
        let err = Config::merge_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_from_missing_path() {
        assert!(Config::load_from_path("/nonexistent/tnl-booking.toml").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::apply_overrides_from(
            Config::default(),
            env(&[
                ("TNL_BOOKING_API_URL", "http://staging:3000"),
                ("TNL_BOOKING_DRAFT_PATH", "/tmp/draft.json"),
                ("TNL_BOOKING_LOG_LEVEL", "warn"),
                ("TNL_BOOKING_TIMEOUT_SECS", " 30 "),
            ]),
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://staging:3000");
        assert_eq!(config.storage.draft_path, PathBuf::from("/tmp/draft.json"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.api.timeout_secs, Some(30));
    }

    #[test]
    fn test_env_override_bad_timeout() {
        let result = Config::apply_overrides_from(
            Config::default(),
            env(&[("TNL_BOOKING_TIMEOUT_SECS", "soon")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.base_url = PRODUCTION_BASE_URL.to_string();
        config.api.timeout_secs = Some(10);
        config.save(&path).unwrap();

        let reloaded = Config::merge_from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
