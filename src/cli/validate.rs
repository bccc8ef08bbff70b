//! `validate-tool`, `validate-config` and `merge` commands.

use serde_json::{Value, json};

use super::CommandOutput;
use crate::merge::{has_executable_tool, merge_tools};
use crate::schema::{
    Issue, IssueKind, PathSegment, ToolDescriptor, ValidationErrors, validate_config_with,
    validate_tool_with,
};
use crate::settings::RegistrySettings;

fn rejected(errors: ValidationErrors) -> anyhow::Result<CommandOutput> {
    tracing::debug!(issues = errors.len(), "submission rejected");
    Ok(CommandOutput::rejected(json!({
        "valid": false,
        "issues": errors.issues(),
    })))
}

pub(super) fn cmd_validate_tool(
    candidate: &Value,
    settings: &RegistrySettings,
) -> anyhow::Result<CommandOutput> {
    match validate_tool_with(candidate, &settings.limits) {
        Ok(tool) => Ok(CommandOutput::accepted(json!({ "valid": true, "tool": tool }))),
        Err(errors) => rejected(errors),
    }
}

pub(super) fn cmd_validate_config(
    candidate: &Value,
    settings: &RegistrySettings,
) -> anyhow::Result<CommandOutput> {
    match validate_config_with(candidate, &settings.limits) {
        Ok(config) => Ok(CommandOutput::accepted(json!({ "valid": true, "config": config }))),
        Err(errors) => rejected(errors),
    }
}

pub(super) fn cmd_merge(
    existing: &Value,
    incoming: &Value,
    settings: &RegistrySettings,
) -> anyhow::Result<CommandOutput> {
    let mut issues = Vec::new();
    let existing = tool_list("existing", existing, settings, &mut issues);
    let incoming = tool_list("incoming", incoming, settings, &mut issues);
    if !issues.is_empty() {
        return rejected(ValidationErrors::new(issues));
    }

    let merged = merge_tools(&existing, &incoming);
    Ok(CommandOutput::accepted(json!({
        "tools": merged,
        "hasExecutableTool": has_executable_tool(&merged),
    })))
}

/// Validate every entry of a tool array, collecting issues under `label`.
fn tool_list(
    label: &str,
    value: &Value,
    settings: &RegistrySettings,
    issues: &mut Vec<Issue>,
) -> Vec<ToolDescriptor> {
    let Some(items) = value.as_array() else {
        issues.push(Issue::new(
            IssueKind::Structural,
            vec![label.into()],
            "must be a JSON array of tools",
        ));
        return Vec::new();
    };

    let mut tools = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match validate_tool_with(item, &settings.limits) {
            Ok(tool) => tools.push(tool),
            Err(errors) => {
                let prefix = [PathSegment::from(label), PathSegment::from(i)];
                issues.extend(
                    errors
                        .into_issues()
                        .into_iter()
                        .map(|issue| issue.with_prefix(&prefix)),
                );
            }
        }
    }
    tools
}
