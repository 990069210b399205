//! Core error types for subhunt.
//!
//! This module defines the central error type shared by the workspace crates.
//! Crate-specific errors (browser, scanner) wrap or convert into these where
//! they cross a crate boundary.

use thiserror::Error;

/// Central error type for shared subhunt operations.
#[derive(Error, Debug)]
pub enum SubhuntError {
    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Refused to overwrite an existing config file
    #[error("config file already exists at {path}")]
    AlreadyExists {
        /// Path of the existing file
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `SubhuntError`.
pub type Result<T> = std::result::Result<T, SubhuntError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubhuntError::Validation("empty domain".to_string());
        assert_eq!(err.to_string(), "validation error: empty domain");

        let err = ConfigError::InvalidValue {
            field: "service.url".to_string(),
            reason: "must use http or https".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for service.url: must use http or https"
        );
    }

    #[test]
    fn test_already_exists_display() {
        let err = ConfigError::AlreadyExists {
            path: "/home/op/.config/subhunt/config.toml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "config file already exists at /home/op/.config/subhunt/config.toml"
        );
    }
}
