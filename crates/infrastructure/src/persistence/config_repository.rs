//! Client configuration persistence.
//!
//! The config file is looked up in this order:
//! - the path in `TICKWATCH_CONFIG`, if set
//! - Linux/macOS: ~/.config/tickwatch/config.json
//! - Windows: %APPDATA%/tickwatch/config.json
//!
//! A missing file is not an error: defaults apply. Environment variables
//! then override individual fields.

use std::path::{Path, PathBuf};

use tickwatch_domain::{ClockConfig, ConfigError};
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "TICKWATCH_CONFIG";
/// Overrides `server_url`.
pub const SERVER_URL_VAR: &str = "TICKWATCH_SERVER_URL";
/// Overrides `records_url`.
pub const RECORDS_URL_VAR: &str = "TICKWATCH_RECORDS_URL";
/// Overrides `start_watching` (`1`/`true`/`yes` or `0`/`false`/`no`).
pub const WATCH_VAR: &str = "TICKWATCH_WATCH";

/// Error type for config operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The resulting configuration is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for the client configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigRepository {
    path: Option<PathBuf>,
}

impl ConfigRepository {
    /// Uses `TICKWATCH_CONFIG`, falling back to the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .or_else(Self::default_path);
        Self { path }
    }

    /// Uses an explicit file path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path to the default config file.
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tickwatch").join("config.json"))
    }

    /// Returns the path where the config is read from, if available.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the config file.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClockConfig, ConfigLoadError> {
        let Some(path) = &self.path else {
            return Ok(ClockConfig::default());
        };

        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(ClockConfig::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(from_json_bytes(&content)?)
    }

    /// Writes the config file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is known or the file cannot be written.
    pub async fn save(&self, config: &ClockConfig) -> Result<(), ConfigLoadError> {
        let Some(path) = &self.path else {
            return Err(ConfigLoadError::NoConfigDir);
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(path, to_json_stable_bytes(config)?).await?;
        Ok(())
    }

    /// Loads the file, applies process environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, an override, or validation fails.
    pub async fn load_effective(&self) -> Result<ClockConfig, ConfigLoadError> {
        let config = self.load().await?;
        let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }
}

/// Applies `TICKWATCH_*` overrides read through `lookup`.
///
/// # Errors
///
/// Returns [`ConfigLoadError::InvalidEnv`] for an unparsable boolean.
pub fn apply_env_overrides(
    mut config: ClockConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClockConfig, ConfigLoadError> {
    if let Some(url) = lookup(SERVER_URL_VAR) {
        config.server_url = url;
    }
    if let Some(url) = lookup(RECORDS_URL_VAR) {
        config.records_url = url;
    }
    if let Some(value) = lookup(WATCH_VAR) {
        config.start_watching = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => {
                return Err(ConfigLoadError::InvalidEnv {
                    var: WATCH_VAR,
                    value,
                });
            }
        };
    }
    Ok(config)
}
