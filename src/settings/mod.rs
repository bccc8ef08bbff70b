//! Environment-driven settings.
//!
//! Reads `REGISTRY_*` variables, after loading a `.env` file when one is
//! present. Only the count and recursion caps are tunable; string length
//! bounds stay fixed.

pub mod helpers;

use crate::error::ConfigError;
use crate::schema::ValidationLimits;
use crate::schema::limits::{
    MAX_CONDITION_DEPTH, MAX_PROPERTIES, MAX_STEPS, MAX_TOOLS, MAX_TOTAL_STEPS,
};

use helpers::{EnvLookup, optional_env, parse_bool_env, parse_optional_env};

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Resolved settings for the registry binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Emit log lines as JSON.
    pub log_json: bool,
    pub limits: ValidationLimits,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            limits: ValidationLimits::default(),
        }
    }
}

impl RegistrySettings {
    /// Load `.env` if present, then resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::resolve_with(&|key: &str| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary lookup.
    pub fn resolve_with(env: &impl EnvLookup) -> Result<Self, ConfigError> {
        let limits = ValidationLimits {
            max_tools: parse_positive(env, "REGISTRY_MAX_TOOLS", MAX_TOOLS)?,
            max_properties: parse_positive(env, "REGISTRY_MAX_PROPERTIES", MAX_PROPERTIES)?,
            max_steps: parse_positive(env, "REGISTRY_MAX_STEPS", MAX_STEPS)?,
            max_condition_depth: parse_optional_env(
                env,
                "REGISTRY_MAX_CONDITION_DEPTH",
                MAX_CONDITION_DEPTH,
            )?,
            max_total_steps: parse_positive(env, "REGISTRY_MAX_TOTAL_STEPS", MAX_TOTAL_STEPS)?,
            ..ValidationLimits::default()
        };

        let settings = Self {
            log_level: optional_env(env, "REGISTRY_LOG_LEVEL")?
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_json: parse_bool_env(env, "REGISTRY_LOG_JSON", false)?,
            limits,
        };
        tracing::debug!(?settings, "resolved registry settings");
        Ok(settings)
    }
}

fn parse_positive(env: &impl EnvLookup, key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = parse_optional_env(env, key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}
