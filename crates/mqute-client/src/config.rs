//! Configuration schema and loader.
//!
//! Configuration is layered with figment, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. `mqute.toml` (or an explicit file passed to [`ConfigLoader::file`])
//! 3. Environment variables, `MQUTE_` prefix with `__` as nesting separator
//!
//! ```text
//! MQUTE_BROKER__PORT=8883        → broker.port = 8883
//! MQUTE_LOGGING__LEVEL=debug     → logging.level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mqute_client::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::credentials::Credentials;

/// Default config file searched in the working directory.
const DEFAULT_CONFIG_FILE: &str = "mqute.toml";

/// Environment variable prefix.
const ENV_PREFIX: &str = "MQUTE_";

// =============================================================================
// Schema
// =============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MquteConfig {
    /// Broker connection settings.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Broker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker URL or IP address.
    #[serde(default = "default_url")]
    pub url: String,

    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Client identifier presented to the broker.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Authentication material.
    #[serde(default)]
    pub credentials: Credentials,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            port: default_port(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
            credentials: Credentials::default(),
        }
    }
}

fn default_url() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "mqute".to_string()
}

fn default_keep_alive_secs() -> u64 {
    60
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target in output.
    #[serde(default = "default_true")]
    pub with_target: bool,

    /// Include thread ids in output.
    #[serde(default)]
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            with_target: true,
            with_thread_ids: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Multi-line human-oriented output.
    Pretty,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Figment extraction failed.
    #[error("Failed to load configuration: {0}")]
    Extract(#[from] figment::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    ValidationError {
        /// What is wrong.
        message: String,
    },
}

impl ConfigError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Loader
// =============================================================================

/// Layered configuration loader.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    skip_env: bool,
}

impl ConfigLoader {
    /// Creates a loader with defaults, `mqute.toml`, and env layering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads from an explicit file instead of `mqute.toml`.
    ///
    /// Unlike the default search, the file must exist.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables the environment variable layer.
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> ConfigResult<MquteConfig> {
        let mut figment = Figment::from(Serialized::defaults(MquteConfig::default()));

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }

        if !self.skip_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config: MquteConfig = figment.extract()?;
        validate(&config)?;
        debug!(
            url = %config.broker.url,
            port = config.broker.port,
            "configuration loaded"
        );
        Ok(config)
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<MquteConfig> {
    ConfigLoader::new().load()
}

fn validate(config: &MquteConfig) -> ConfigResult<()> {
    if config.broker.url.trim().is_empty() {
        return Err(ConfigError::validation("broker.url must not be empty"));
    }
    if config.broker.port == 0 {
        return Err(ConfigError::validation("broker.port must not be zero"));
    }
    if config.broker.client_id.trim().is_empty() {
        return Err(ConfigError::validation("broker.client_id must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_any_source() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::new().load().expect("load defaults");
            assert_eq!(config.broker.url, "localhost");
            assert_eq!(config.broker.port, 1883);
            assert_eq!(config.broker.credentials, Credentials::Anonymous);
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "mqute.toml",
                r#"
                [broker]
                url = "broker.example"
                port = 8883
                credentials = { scheme = "user_pass", username = "admin", password = "password" }

                [logging]
                level = "debug"
                format = "pretty"
                "#,
            )?;
            jail.set_env("MQUTE_BROKER__PORT", "1884");

            let config = ConfigLoader::new().load().expect("load layered config");
            assert_eq!(config.broker.url, "broker.example");
            assert_eq!(config.broker.port, 1884);
            assert_eq!(
                config.broker.credentials,
                Credentials::user_pass("admin", "password")
            );
            assert_eq!(config.logging.format, LogFormat::Pretty);
            Ok(())
        });
    }

    #[test]
    fn explicit_file_must_exist() {
        figment::Jail::expect_with(|_jail| {
            let err = ConfigLoader::new()
                .file("missing.toml")
                .load()
                .expect_err("missing file must fail");
            assert!(matches!(err, ConfigError::FileNotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_port_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MQUTE_BROKER__PORT", "0");
            let err = ConfigLoader::new().load().expect_err("port 0 must fail");
            assert!(matches!(err, ConfigError::ValidationError { .. }));
            Ok(())
        });
    }
}
