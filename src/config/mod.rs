//! Configuration Module
//!
//! Handles application configuration loading, validation, and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key (loaded from env; kept out of serialized output so a saved
    /// config file never contains the secret)
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// API base URL (default: "https://api.openai.com/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds, passed straight through to the
    /// transport layer (default: 60)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: "127.0.0.1")
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Server port (default: 8787)
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_server_bind(),
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/crabvoice/config.toml
    /// 3. Local config: ./crabvoice.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        // Start with defaults
        let mut config = Self::default();

        // 1. Try to load system config
        if let Some(system_config_path) = Self::system_config_path()
            && system_config_path.exists()
        {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::merge_from_file(config, &system_config_path)?;
        }

        // 2. Try to load local config
        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::merge_from_file(config, &local_config_path)?;
        }

        // 3. Apply environment variable overrides
        config = Self::apply_env_overrides(config);

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        // Start with defaults
        let mut config = Self::default();

        // Load from custom path
        if path.exists() {
            config = Self::merge_from_file(config, path)?;
        } else {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        // Apply environment variable overrides
        config = Self::apply_env_overrides(config);

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Get the system config path: ~/.config/crabvoice/config.toml
    fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crabvoice").join("config.toml"))
    }

    /// Get the local config path: ./crabvoice.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./crabvoice.toml")
    }

    /// Load and merge configuration from a TOML file
    fn merge_from_file(base: Self, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let file_config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(Self::merge(base, file_config))
    }

    /// Merge two configs (file_config overwrites base where specified)
    fn merge(base: Self, overlay: Self) -> Self {
        Self {
            api: ApiConfig {
                // api_key is never read from files, only env or per-request
                api_key: base.api.api_key,
                base_url: overlay.api.base_url,
                timeout_secs: overlay.api.timeout_secs,
            },
            server: overlay.server,
            logging: overlay.logging,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Self) -> Self {
        // OpenAI credentials
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY")
            && !api_key.is_empty()
        {
            config.api.api_key = Some(api_key);
        }

        // OpenAI base URL (for Azure, LM Studio, proxies, etc.)
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.api.base_url = base_url;
        }

        // Request timeout
        if let Ok(timeout) = std::env::var("CRABVOICE_TIMEOUT_SECS")
            && let Ok(secs) = timeout.parse()
        {
            config.api.timeout_secs = secs;
        }

        // Server bind/port
        if let Ok(bind) = std::env::var("CRABVOICE_BIND") {
            config.server.bind = bind;
        }

        if let Ok(port) = std::env::var("CRABVOICE_PORT")
            && let Ok(port) = port.parse()
        {
            config.server.port = port;
        }

        // Log level
        if let Ok(log_level) = std::env::var("CRABVOICE_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        // Log file
        if let Ok(log_file) = std::env::var("CRABVOICE_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(log_file));
        }

        config
    }

    /// Check if an API key is configured (from env or .env).
    pub fn has_api_key(&self) -> bool {
        self.api.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        // Validate API base URL
        if self.api.base_url.is_empty() {
            anyhow::bail!("API base_url is empty");
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("API timeout_secs must be greater than zero");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file (secrets are never serialized)
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        // Create parent directory if it doesn't exist
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
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
        assert!(config.api.api_key.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_content = r#"
[api]
base_url = "http://localhost:1234/v1"
timeout_secs = 30

[server]
bind = "0.0.0.0"
port = 9090

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:1234/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.api.api_key = Some("sk-super-secret".to_string());

        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(
            !serialized.contains("sk-super-secret"),
            "API key must never reach a config file: {}",
            serialized
        );
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::default();

        // Save config
        config.save(temp_file.path()).unwrap();

        // Load config back
        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        let loaded_config: Config = toml::from_str(&contents).unwrap();

        assert_eq!(loaded_config.logging.level, config.logging.level);
        assert_eq!(loaded_config.server.port, config.server.port);
    }

    #[test]
    fn test_system_config_path() {
        let path = Config::system_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("crabvoice"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_local_config_path() {
        let path = Config::local_config_path();
        assert_eq!(path, PathBuf::from("./crabvoice.toml"));
    }

    #[test]
    fn test_timeout_duration() {
        let api = ApiConfig {
            timeout_secs: 15,
            ..Default::default()
        };
        assert_eq!(api.timeout(), Duration::from_secs(15));
    }
}
