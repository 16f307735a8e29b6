//! Configuration management for tagbox.
//!
//! Resolution order, lowest priority first: hardcoded defaults, the TOML
//! config file, CLI overrides. The merged [`Config`] is resolved once at
//! startup and handed to the widgets.

mod options;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use options::{
    AutocompleteOptions, BoundaryPolicy, TagInputOptions, DEFAULT_ALLOWED_TAGS_PATTERN,
};

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The config file exists but could not be read.
    #[error("could not read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The config file is not valid TOML or has wrong types.
    #[error("invalid configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// `allowed_tags_pattern` is not a valid regular expression.
    #[error("invalid allowed_tags_pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// The merged application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tag collection and staged-input options.
    pub tags: TagInputOptions,
    /// Suggestion panel options.
    pub autocomplete: AutocompleteOptions,
}

impl Config {
    /// Load the config from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            Ok(_) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Load the config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The default config file path (`<config dir>/tagbox/config.toml`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("tagbox").join("config.toml"))
    }
}
