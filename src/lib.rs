//! Registry core for WebMCP tool configs.
//!
//! Resolves which community-submitted configs apply to a URL, and validates
//! that each tool's execution metadata agrees with its parameter schema.
//! Everything here is a pure, synchronous computation over caller-supplied
//! values: nothing is fetched, executed, or persisted.
//!
//! - [`pattern`]: URL pattern matching and specificity ranking
//! - [`schema`]: tool and config validation
//! - [`merge`]: merge-by-name and verified-snapshot pruning
//! - [`registry`]: the at-rest config record
//! - [`settings`]: environment-driven limits and logging options

pub mod cli;
pub mod error;
pub mod merge;
pub mod pattern;
pub mod registry;
pub mod schema;
pub mod settings;

pub use error::ConfigError;
pub use pattern::{MatchResult, match_pattern, rank_by_url};
pub use schema::{ValidationErrors, validate_config, validate_tool};
