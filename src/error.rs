//! Error types for the registry core.

use thiserror::Error;

pub use crate::schema::ValidationErrors;

/// Errors resolving settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// What was wrong with it.
        message: String,
    },
}
