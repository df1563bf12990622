use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::{Config, MAX_HISTORY_LIMIT};

/// Why a slicestore config file could not be turned into a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read slicestore config '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in slicestore config '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid slicestore config: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// `<config_dir>/slicestore/config.toml`, or `./slicestore/config.toml`
    /// on platforms without a config directory.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slicestore")
            .join("config.toml")
    }

    /// Config for the binary: the file at [`Config::config_path`] when it
    /// exists, built-in defaults otherwise.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Reads, parses and validates the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), store = %config.store.name, "Config loaded");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The store name is not blank
    /// - The dispatch history limit is bounded
    /// - The log filter is a valid `EnvFilter` directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Store name must not be empty".to_string(),
            });
        }

        if self.store.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "history_limit {} exceeds the maximum of {}",
                    self.store.history_limit, MAX_HISTORY_LIMIT
                ),
            });
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid log filter '{}': {}", self.logging.filter, e),
            });
        }

        Ok(())
    }
}
