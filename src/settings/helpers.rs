//! Typed readers over an environment lookup.
//!
//! Each reader takes the lookup as a parameter so settings can be resolved
//! from the process environment or from an in-memory map.

use std::str::FromStr;

use crate::error::ConfigError;

/// A source of environment values.
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Read `key`, treating an empty or whitespace-only value as unset.
pub fn optional_env(env: &impl EnvLookup, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(env
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Read and parse `key`, falling back to `default` when unset.
pub fn parse_optional_env<T>(env: &impl EnvLookup, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(env, key)? {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("\"{raw}\": {e}"),
        }),
        None => Ok(default),
    }
}

/// Read a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_bool_env(env: &impl EnvLookup, key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = optional_env(env, key)? else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("\"{raw}\" is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_optional_env_blank_is_unset() {
        let lookup = env(&[("A", "  "), ("B", " value ")]);
        assert_eq!(optional_env(&lookup, "A").unwrap(), None);
        assert_eq!(optional_env(&lookup, "B").unwrap().as_deref(), Some("value"));
        assert_eq!(optional_env(&lookup, "C").unwrap(), None);
    }

    #[test]
    fn test_parse_optional_env() {
        let lookup = env(&[("N", "42"), ("BAD", "forty")]);
        assert_eq!(parse_optional_env(&lookup, "N", 1usize).unwrap(), 42);
        assert_eq!(parse_optional_env(&lookup, "MISSING", 7usize).unwrap(), 7);

        let err = parse_optional_env(&lookup, "BAD", 1usize).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BAD"));
    }

    #[test]
    fn test_parse_bool_env() {
        let lookup = env(&[("T", "Yes"), ("F", "0"), ("X", "maybe")]);
        assert!(parse_bool_env(&lookup, "T", false).unwrap());
        assert!(!parse_bool_env(&lookup, "F", true).unwrap());
        assert!(parse_bool_env(&lookup, "UNSET", true).unwrap());
        assert!(parse_bool_env(&lookup, "X", false).is_err());
    }
}
