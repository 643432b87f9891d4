//! Configuration management for convergent
//!
//! A replica's identity, logging and property-check settings, loaded from
//! defaults, `CONVERGENT_*` environment variables or a TOML file.

use crate::crdt::PeerId;
use crate::logging::LogLevel;
use crate::test_utils::StateShape;
use serde::{Deserialize, Serialize};
use std::env;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Replica identity
    pub replica: ReplicaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Convergence checker configuration
    pub checker: CheckerConfig,
}

/// Replica configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Fixed peer id; a random one is generated when unset
    pub peer_id: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Settings for `convergent check`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Random state triples per CRDT type
    pub cases: u64,

    /// Run seed
    pub seed: u64,

    /// Distinct writers in generated states
    pub peers: usize,

    /// Distinct keys in generated map states
    pub keys: usize,

    /// Largest generated timestamp
    pub max_timestamp: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        let shape = StateShape::default();
        Self {
            cases: 1_000,
            seed: 42,
            peers: shape.peers,
            keys: shape.keys,
            max_timestamp: shape.max_timestamp,
        }
    }
}

impl ReplicaConfig {
    /// Configured peer id, or a freshly generated one
    pub fn peer_id(&self) -> Result<PeerId, ConfigError> {
        match &self.peer_id {
            Some(id) => PeerId::parse(id.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid peer id: {}", e))),
            None => Ok(PeerId::generate()),
        }
    }
}

impl CheckerConfig {
    /// Generator shape described by this section
    pub fn shape(&self) -> StateShape {
        StateShape {
            peers: self.peers,
            keys: self.keys,
            max_timestamp: self.max_timestamp,
        }
    }
}

fn parse_var<T>(name: &str, what: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: CONVERGENT_<SECTION>_<KEY>
    /// Example: CONVERGENT_REPLICA_PEER_ID=node-1
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay any `CONVERGENT_*` variables onto this configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(peer_id) = env::var("CONVERGENT_REPLICA_PEER_ID") {
            self.replica.peer_id = Some(peer_id);
        }

        if let Ok(level) = env::var("CONVERGENT_LOGGING_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_var("CONVERGENT_LOGGING_JSON_FORMAT", "JSON flag")? {
            self.logging.json_format = json;
        }
        if let Some(with_timestamp) =
            parse_var("CONVERGENT_LOGGING_WITH_TIMESTAMP", "timestamp flag")?
        {
            self.logging.with_timestamp = with_timestamp;
        }
        if let Some(with_target) = parse_var("CONVERGENT_LOGGING_WITH_TARGET", "target flag")? {
            self.logging.with_target = with_target;
        }

        if let Some(cases) = parse_var("CONVERGENT_CHECKER_CASES", "checker cases")? {
            self.checker.cases = cases;
        }
        if let Some(seed) = parse_var("CONVERGENT_CHECKER_SEED", "checker seed")? {
            self.checker.seed = seed;
        }
        if let Some(peers) = parse_var("CONVERGENT_CHECKER_PEERS", "checker peers")? {
            self.checker.peers = peers;
        }
        if let Some(keys) = parse_var("CONVERGENT_CHECKER_KEYS", "checker keys")? {
            self.checker.keys = keys;
        }
        if let Some(max_timestamp) =
            parse_var("CONVERGENT_CHECKER_MAX_TIMESTAMP", "checker max timestamp")?
        {
            self.checker.max_timestamp = max_timestamp;
        }

        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(peer_id) = &self.replica.peer_id {
            if peer_id.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "peer_id must not be empty".to_string(),
                ));
            }
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        if self.checker.cases == 0 {
            return Err(ConfigError::ValidationFailed(
                "checker cases must be greater than 0".to_string(),
            ));
        }

        if self.checker.peers == 0 {
            return Err(ConfigError::ValidationFailed(
                "checker peers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
