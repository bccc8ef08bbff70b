//! CLI command handling.
//!
//! Provides subcommands for:
//! - Scoring one pattern against a URL (`match`)
//! - Ranking several patterns against a URL (`rank`)
//! - Validating tool and config submissions (`validate-tool`, `validate-config`)
//! - Merging two tool lists (`merge`)
//!
//! Every command produces a JSON document. A rejected submission is still a
//! successful run of the command; it is reported through [`CommandOutput::success`].

mod pattern;
mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ColorChoice, Parser, Subcommand};
use serde_json::Value;

use crate::settings::RegistrySettings;

#[derive(Parser, Debug)]
#[command(name = "webmcp-registry")]
#[command(about = "Match URL patterns and validate WebMCP tool configs")]
#[command(
    long_about = "Offline checks for WebMCP registry submissions.\nExamples:\n  webmcp-registry validate-config config.json\n  webmcp-registry match 'example.com/users/:id' https://example.com/users/42 --domain example.com"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score one URL pattern against a URL
    #[command(
        about = "Match a pattern against a URL",
        long_about = "Prints {matched, score, params}.\nExample: webmcp-registry match 'example.com/admin/**' https://example.com/admin/x --domain example.com"
    )]
    Match {
        /// Pattern in `domain/path` form
        pattern: String,

        /// Concrete URL to test
        url: String,

        /// Domain the pattern is scoped to
        #[arg(short, long, env = "REGISTRY_DOMAIN")]
        domain: String,
    },

    /// Rank URL patterns by specificity
    #[command(
        about = "Rank patterns against a URL",
        long_about = "Prints matching patterns, most specific first.\nExample: webmcp-registry rank https://example.com/a --domain example.com example.com example.com/a"
    )]
    Rank {
        /// Concrete URL to rank against
        url: String,

        /// Domain the patterns are scoped to
        #[arg(short, long, env = "REGISTRY_DOMAIN")]
        domain: String,

        /// Candidate patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Validate a tool definition
    #[command(
        about = "Validate a tool JSON file",
        long_about = "Prints the parsed tool, or every issue found.\nUse '-' to read from stdin.\nExample: webmcp-registry validate-tool tool.json"
    )]
    ValidateTool {
        /// Path to a JSON file, or '-' for stdin
        file: PathBuf,
    },

    /// Validate a config submission
    #[command(
        about = "Validate a config JSON file",
        long_about = "Prints the normalized config, or every issue found.\nUse '-' to read from stdin.\nExample: webmcp-registry validate-config config.json"
    )]
    ValidateConfig {
        /// Path to a JSON file, or '-' for stdin
        file: PathBuf,
    },

    /// Merge incoming tools into an existing tool list
    #[command(
        about = "Merge two tool lists by name",
        long_about = "Both files hold a JSON array of tools. Prints the merged list and whether any tool is executable.\nExample: webmcp-registry merge current.json update.json"
    )]
    Merge {
        /// Current tool list
        existing: PathBuf,

        /// Tools to add or overwrite
        incoming: PathBuf,
    },
}

/// What a command printed, and whether its input was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub body: Value,
    pub success: bool,
}

impl CommandOutput {
    fn accepted(body: Value) -> Self {
        Self {
            body,
            success: true,
        }
    }

    fn rejected(body: Value) -> Self {
        Self {
            body,
            success: false,
        }
    }
}

/// Run a command against resolved settings.
pub fn run_command(cmd: Command, settings: &RegistrySettings) -> anyhow::Result<CommandOutput> {
    match cmd {
        Command::Match {
            pattern,
            url,
            domain,
        } => pattern::cmd_match(&pattern, &url, &domain),
        Command::Rank {
            url,
            domain,
            patterns,
        } => pattern::cmd_rank(&url, &domain, &patterns),
        Command::ValidateTool { file } => validate::cmd_validate_tool(&read_json(&file)?, settings),
        Command::ValidateConfig { file } => {
            validate::cmd_validate_config(&read_json(&file)?, settings)
        }
        Command::Merge { existing, incoming } => {
            validate::cmd_merge(&read_json(&existing)?, &read_json(&incoming)?, settings)
        }
    }
}

/// Read a JSON document from a file, or from stdin for `-`.
fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
