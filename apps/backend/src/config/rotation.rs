//! Rotation tuning knobs.
//!
//! Defaults match the documented product behaviour. Deployments override
//! them through `WALKS_*` environment variables or a JSON blob; both paths
//! run [`RotationConfig::validate`].

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ErrorCode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{name}' has invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("invalid rotation config: {0}")]
    Invalid(String),

    #[error("malformed rotation config json: {0}")]
    Json(String),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ConfigError
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Tolerance on either side of the walk window.
    pub leeway_minutes: i64,
    /// Added to `date + duration` when there is no explicit end.
    pub buffer_minutes: i64,
    /// Floor for a suggested round length.
    pub min_round_minutes: i64,
    /// Round length when nothing better can be computed.
    pub default_round_minutes: i64,
    pub default_group_size: u8,
    pub max_pairing_attempts: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            leeway_minutes: 60,
            buffer_minutes: 60,
            min_round_minutes: 5,
            default_round_minutes: 15,
            default_group_size: 2,
            max_pairing_attempts: 64,
        }
    }
}

impl RotationConfig {
    /// Read overrides from the environment. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            leeway_minutes: var_or("WALKS_LEEWAY_MINUTES", defaults.leeway_minutes)?,
            buffer_minutes: var_or("WALKS_BUFFER_MINUTES", defaults.buffer_minutes)?,
            min_round_minutes: var_or("WALKS_MIN_ROUND_MINUTES", defaults.min_round_minutes)?,
            default_round_minutes: var_or(
                "WALKS_DEFAULT_ROUND_MINUTES",
                defaults.default_round_minutes,
            )?,
            default_group_size: var_or("WALKS_DEFAULT_GROUP_SIZE", defaults.default_group_size)?,
            max_pairing_attempts: var_or(
                "WALKS_MAX_PAIRING_ATTEMPTS",
                defaults.max_pairing_attempts,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config blob. Missing keys keep defaults.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_value(value.clone()).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leeway_minutes < 0 || self.buffer_minutes < 0 {
            return Err(ConfigError::Invalid(
                "leeway and buffer must not be negative".to_string(),
            ));
        }
        if self.min_round_minutes < 1 {
            return Err(ConfigError::Invalid(format!(
                "min_round_minutes must be at least 1, got {}",
                self.min_round_minutes
            )));
        }
        if self.default_round_minutes < self.min_round_minutes {
            return Err(ConfigError::Invalid(format!(
                "default_round_minutes ({}) is below min_round_minutes ({})",
                self.default_round_minutes, self.min_round_minutes
            )));
        }
        if self.default_group_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "default_group_size must be at least 2, got {}",
                self.default_group_size
            )));
        }
        if self.max_pairing_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_pairing_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn var_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidVar {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
