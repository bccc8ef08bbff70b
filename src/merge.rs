//! Merge-by-name and prune-by-existence over a config's tool set.
//!
//! All operations are total: they never fail and never touch their inputs.

use std::collections::{BTreeMap, HashMap};

use crate::schema::ToolDescriptor;

/// Tool name to the definition frozen when it was last verified.
pub type VerifiedMap = BTreeMap<String, ToolDescriptor>;

/// Merge `incoming` into `existing` by name.
///
/// Names only in `existing` keep their definition and position. Names in
/// both take the `incoming` definition at the existing position. Names only
/// in `incoming` are appended in order.
pub fn merge_tools(existing: &[ToolDescriptor], incoming: &[ToolDescriptor]) -> Vec<ToolDescriptor> {
    let mut merged: Vec<ToolDescriptor> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut upsert = |tool: &ToolDescriptor| match index.get(&tool.name) {
        Some(&pos) => merged[pos] = tool.clone(),
        None => {
            index.insert(tool.name.clone(), merged.len());
            merged.push(tool.clone());
        }
    };

    existing.iter().chain(incoming).for_each(upsert);

    tracing::debug!(
        existing = existing.len(),
        incoming = incoming.len(),
        merged = merged.len(),
        "merged tool sets"
    );

    merged
}

/// Keep only the verified entries whose tool still exists.
pub fn prune_verified<'a, I>(verified: &VerifiedMap, current_names: I) -> VerifiedMap
where
    I: IntoIterator<Item = &'a str>,
{
    let current: std::collections::HashSet<&str> = current_names.into_iter().collect();
    let pruned: VerifiedMap = verified
        .iter()
        .filter(|(name, _)| current.contains(name.as_str()))
        .map(|(name, tool)| (name.clone(), tool.clone()))
        .collect();

    let dropped = verified.len() - pruned.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = pruned.len(), "pruned stale verified snapshots");
    }
    pruned
}

/// True iff any tool carries execution metadata.
pub fn has_executable_tool(tools: &[ToolDescriptor]) -> bool {
    tools.iter().any(ToolDescriptor::is_executable)
}

/// Outcome of removing one tool by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Deletion {
    pub tools: Vec<ToolDescriptor>,
    pub verified: VerifiedMap,
    /// Whether a tool with that name existed.
    pub removed: bool,
    /// No tools remain; the caller decides whether to drop the config.
    pub is_empty: bool,
    pub has_executable_tool: bool,
}

/// Remove the tool called `name` and prune the verified map to match.
pub fn delete_tool(tools: &[ToolDescriptor], verified: &VerifiedMap, name: &str) -> Deletion {
    let remaining: Vec<ToolDescriptor> = tools.iter().filter(|t| t.name != name).cloned().collect();
    let removed = remaining.len() != tools.len();
    let verified = prune_verified(verified, remaining.iter().map(|t| t.name.as_str()));

    tracing::debug!(tool = %name, removed, remaining = remaining.len(), "deleted tool");

    Deletion {
        is_empty: remaining.is_empty(),
        has_executable_tool: has_executable_tool(&remaining),
        tools: remaining,
        verified,
        removed,
    }
}
