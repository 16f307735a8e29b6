//! Centralized error types for tagbox.

use thiserror::Error;

use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// IO errors (file system, terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// A message suitable for showing to users, without internals.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(ConfigError::NoConfigDir) => {
                "Could not find the configuration directory. Check your system settings."
                    .to_string()
            }
            AppError::Config(ConfigError::ReadError(_)) => {
                "Could not read the configuration file. Check that it exists and is readable."
                    .to_string()
            }
            AppError::Config(ConfigError::ParseError(_)) => {
                "The configuration file is invalid. Check the file format.".to_string()
            }
            AppError::Config(ConfigError::InvalidPattern(_)) => {
                "allowed_tags_pattern is not a valid regular expression.".to_string()
            }
            AppError::Io(_) => {
                "A terminal or file operation failed. Check file permissions.".to_string()
            }
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
