//! Dispatcher configuration.
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables (`ALPHA_QUANTUM_` prefix)
//! 2. YAML configuration file
//! 3. Default values
//!
//! ```yaml
//! conflict_policy: reject
//! validate_parameters: true
//! timeout_ms: 30000
//! logging:
//!   level: debug
//!   format: json
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::error::DispatchError;
use crate::registry::ConflictPolicy;

pub const ENV_CONFLICT_POLICY: &str = "ALPHA_QUANTUM_CONFLICT_POLICY";
pub const ENV_VALIDATE_PARAMETERS: &str = "ALPHA_QUANTUM_VALIDATE_PARAMETERS";
pub const ENV_TIMEOUT_MS: &str = "ALPHA_QUANTUM_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "ALPHA_QUANTUM_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "ALPHA_QUANTUM_LOG_FORMAT";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for DispatchError {
    fn from(err: ConfigError) -> Self {
        DispatchError::Configuration(err.to_string())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Console,
    /// One JSON object per line.
    Json,
}

/// Logging settings, consumed by [`init_tracing`](crate::telemetry::init_tracing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (`info`, `alpha_quantum=debug,warn`, ...);
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Console,
        }
    }
}

/// Complete dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Behavior on duplicate registration.
    pub conflict_policy: ConflictPolicy,
    /// Check parameters against the capability schema before invoking.
    pub validate_parameters: bool,
    /// Per-call budget for `invoke`. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    pub logging: LoggingConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::Replace,
            validate_parameters: true,
            timeout_ms: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl DispatchConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DispatchConfig =
            serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Load from an optional file, then apply process environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup function.
    pub fn merge_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(policy) = lookup(ENV_CONFLICT_POLICY) {
            self.conflict_policy = match policy.trim().to_ascii_lowercase().as_str() {
                "replace" => ConflictPolicy::Replace,
                "reject" => ConflictPolicy::Reject,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "{ENV_CONFLICT_POLICY}: unknown policy '{other}'"
                    )));
                }
            };
        }
        if let Some(validate) = lookup(ENV_VALIDATE_PARAMETERS) {
            self.validate_parameters = parse_bool(&validate).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "{ENV_VALIDATE_PARAMETERS}: expected a boolean, got '{validate}'"
                ))
            })?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = Some(timeout.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{ENV_TIMEOUT_MS}: expected milliseconds, got '{timeout}'"
                ))
            })?);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = match format.trim().to_ascii_lowercase().as_str() {
                "console" => LogFormat::Console,
                "json" => LogFormat::Json,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "{ENV_LOG_FORMAT}: unknown format '{other}' (expected console or json)"
                    )));
                }
            };
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::Validation(format!(
                "invalid log filter '{}': {e}",
                self.logging.level
            )));
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
