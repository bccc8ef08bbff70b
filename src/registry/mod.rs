//! The at-rest config record and its lifecycle.
//!
//! A [`Config`] scopes an ordered tool set to one domain and URL pattern.
//! Every change to its metadata or tools bumps `version`, and the verified
//! snapshot map is pruned whenever the tool set changes. Persisting the
//! record, and making read-modify-write cycles atomic, is left to callers.

use serde::{Deserialize, Serialize};

use crate::merge::{self, VerifiedMap};
use crate::pattern::Patterned;
use crate::schema::{ConfigInput, ToolDescriptor};

/// A config as stored by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub domain: String,
    pub url_pattern: String,
    pub title: String,
    pub description: String,
    pub contributor: String,
    /// Starts at 1; incremented on every metadata or tool-set change.
    pub version: u64,
    pub tags: Vec<String>,
    pub tools: Vec<ToolDescriptor>,
    /// Snapshots taken when each tool was last approved.
    #[serde(default)]
    pub verified: VerifiedMap,
    pub has_executable_tool: bool,
}

/// Metadata changes; `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Result of [`Config::remove_tool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub removed: bool,
    /// The config has no tools left.
    pub is_empty: bool,
}

/// How a tool's live definition relates to its verified snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The snapshot equals the live definition.
    Verified,
    /// The tool changed after it was verified.
    Stale,
    Unverified,
}

impl Config {
    /// Create a record from a validated submission.
    pub fn from_input(input: ConfigInput, contributor: impl Into<String>) -> Self {
        let has_executable_tool = merge::has_executable_tool(&input.tools);
        Self {
            domain: input.domain,
            url_pattern: input.url_pattern,
            title: input.title,
            description: input.description,
            contributor: contributor.into(),
            version: 1,
            tags: input.tags,
            tools: input.tools,
            verified: VerifiedMap::new(),
            has_executable_tool,
        }
    }

    /// Merge validated tools into this config.
    ///
    /// Returns whether the tool set changed.
    pub fn apply_tools(&mut self, incoming: &[ToolDescriptor]) -> bool {
        let merged = merge::merge_tools(&self.tools, incoming);
        if merged == self.tools {
            return false;
        }

        self.verified = merge::prune_verified(&self.verified, merged.iter().map(|t| t.name.as_str()));
        self.has_executable_tool = merge::has_executable_tool(&merged);
        self.tools = merged;
        self.bump();
        true
    }

    /// Apply metadata changes, bumping the version only if something differs.
    pub fn update_metadata(&mut self, update: MetadataUpdate) -> bool {
        let mut changed = false;
        if let Some(title) = update.title.filter(|t| *t != self.title) {
            self.title = title;
            changed = true;
        }
        if let Some(description) = update.description.filter(|d| *d != self.description) {
            self.description = description;
            changed = true;
        }
        if let Some(tags) = update.tags.filter(|t| *t != self.tags) {
            self.tags = tags;
            changed = true;
        }
        if changed {
            self.bump();
        }
        changed
    }

    /// Delete one tool by name.
    pub fn remove_tool(&mut self, name: &str) -> Removal {
        let deletion = merge::delete_tool(&self.tools, &self.verified, name);
        if deletion.removed {
            self.tools = deletion.tools;
            self.verified = deletion.verified;
            self.has_executable_tool = deletion.has_executable_tool;
            self.bump();
        }
        Removal {
            removed: deletion.removed,
            is_empty: deletion.is_empty,
        }
    }

    /// Freeze the current definition of `name` as verified.
    ///
    /// Returns `false` if the config has no such tool.
    pub fn verify_tool(&mut self, name: &str) -> bool {
        let Some(tool) = self.tool(name) else {
            return false;
        };
        let snapshot = tool.clone();
        self.verified.insert(name.to_string(), snapshot);
        tracing::debug!(tool = %name, domain = %self.domain, "recorded verified snapshot");
        true
    }

    pub fn verification(&self, name: &str) -> VerificationStatus {
        match (self.tool(name), self.verified.get(name)) {
            (Some(live), Some(snapshot)) if live == snapshot => VerificationStatus::Verified,
            (Some(_), Some(_)) => VerificationStatus::Stale,
            _ => VerificationStatus::Unverified,
        }
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    fn bump(&mut self) {
        self.version += 1;
        tracing::debug!(url_pattern = %self.url_pattern, version = self.version, "config version bumped");
    }
}

impl Patterned for Config {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }
}
