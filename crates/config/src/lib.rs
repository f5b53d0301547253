#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for nxfw
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/nxfw/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod sections;

pub use sections::{CdnConfig, CodecConfig, GeneralConfig, NetworkConfig, PathConfig, ResolverConfig};

use nxfw_errors::{ConfigError, Error};
use nxfw_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub cdn: CdnConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub codec: CodecConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or holds values that fail validation.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// If path is provided, loads from that file.
    /// If path is None, uses the default loading behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // NXFW_COLOR
        if let Ok(color) = std::env::var("NXFW_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "NXFW_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        if let Some(downloads) = env_parse("NXFW_PARALLEL_DOWNLOADS")? {
            self.general.parallel_downloads = downloads;
        }
        if let Some(timeout) = env_parse("NXFW_TIMEOUT_SECS")? {
            self.network.timeout_secs = timeout;
        }
        if let Some(retries) = env_parse("NXFW_RETRIES")? {
            self.network.retries = retries;
        }
        if let Some(deadline) = env_parse("NXFW_DEADLINE_SECS")? {
            self.network.deadline_secs = deadline;
        }
        if let Some(accept) = env_bool("NXFW_ACCEPT_INVALID_CERTS")? {
            self.cdn.accept_invalid_certs = accept;
        }
        if let Some(verify) = env_bool("NXFW_VERIFY_CONTENT_HASH")? {
            self.cdn.verify_content_hash = verify;
        }

        // NXFW_STAGING_DIR
        if let Ok(dir) = std::env::var("NXFW_STAGING_DIR") {
            self.paths.staging_dir = Some(PathBuf::from(dir));
        }

        // NXFW_DECODER
        if let Ok(command) = std::env::var("NXFW_DECODER") {
            self.codec.command = Some(command);
        }

        self.validate()
    }

    /// Reject values that would make the downloader unusable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), Error> {
        let zero_check = [
            ("general.parallel_downloads", self.general.parallel_downloads == 0),
            ("network.timeout_secs", self.network.timeout_secs == 0),
            ("network.deadline_secs", self.network.deadline_secs == 0),
            ("resolver.max_depth", self.resolver.max_depth == 0),
        ];
        if let Some((field, _)) = zero_check.iter().find(|(_, zero)| *zero) {
            return Err(ConfigError::InvalidValue {
                field: (*field).to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Get the staging path (with default)
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.paths
            .staging_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(constants::APP_DIR))
    }

    /// Get the logs path (with default)
    #[must_use]
    pub fn logs_path(&self) -> PathBuf {
        self.paths.logs_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_DIR)
                .join("logs")
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout_secs)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.network.retry_delay_ms)
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.network.deadline_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, Error> {
    match std::env::var(name) {
        Ok(value) => value.parse().map(Some).map_err(|_| {
            ConfigError::InvalidValue {
                field: name.to_string(),
                value,
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>, Error> {
    match std::env::var(name) {
        Ok(value) => match value.as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                field: name.to_string(),
                value,
            }
            .into()),
        },
        Err(_) => Ok(None),
    }
}
