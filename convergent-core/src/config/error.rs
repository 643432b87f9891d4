//! Configuration error types

use thiserror::Error;

/// Errors raised while loading, validating or saving a `Config`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    FileReadError(String),

    #[error("Failed to write configuration file: {0}")]
    FileWriteError(String),

    /// TOML did not match the `Config` shape
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    /// An environment variable or field could not be parsed
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Values parsed but are out of range
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
