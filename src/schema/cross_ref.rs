//! Relational checks between a tool's `inputSchema` and its execution metadata.
//!
//! Runs only on tools that already passed structural validation. Issue paths
//! are relative to the tool.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::issue::{Issue, IssueKind, PathSegment};
use super::{ActionStep, ToolDescriptor};

static TEMPLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("template token regex is valid"));

/// A `{{token}}` occurrence in a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken<'a> {
    /// The full `{{ ... }}` text as written.
    pub literal: &'a str,
    /// The trimmed name between the braces.
    pub name: &'a str,
}

/// Every `{{token}}` in `text`, in order of appearance.
pub fn template_tokens(text: &str) -> Vec<TemplateToken<'_>> {
    TEMPLATE_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let literal = caps.get(0)?.as_str();
            let name = caps.get(1)?.as_str().trim();
            Some(TemplateToken { literal, name })
        })
        .collect()
}

/// Check field names and step templates of `tool` against its properties.
pub fn check_tool(tool: &ToolDescriptor) -> Vec<Issue> {
    let Some(execution) = &tool.execution else {
        return Vec::new();
    };

    let properties = tool.property_names();
    let mut issues = Vec::new();

    for (i, field) in execution.fields.iter().enumerate() {
        if !properties.contains(field.name.as_str()) {
            issues.push(Issue::new(
                IssueKind::CrossReference,
                vec!["execution".into(), "fields".into(), i.into(), "name".into()],
                format!(
                    "field {i} \"{}\" does not match any inputSchema property; {}",
                    field.name,
                    describe_properties(&properties)
                ),
            ));
        }
    }

    let mut path: Vec<PathSegment> = vec!["execution".into(), "steps".into()];
    check_steps(&execution.steps, &properties, &mut path, &mut issues);

    if !issues.is_empty() {
        tracing::debug!(tool = %tool.name, issues = issues.len(), "cross-reference check failed");
    }
    issues
}

fn check_steps(
    steps: &[ActionStep],
    properties: &BTreeSet<&str>,
    path: &mut Vec<PathSegment>,
    issues: &mut Vec<Issue>,
) {
    for (i, step) in steps.iter().enumerate() {
        path.push(i.into());

        for (field, text) in step.template_fields() {
            for token in template_tokens(text) {
                if properties.contains(token.name) {
                    continue;
                }
                let mut at = path.clone();
                at.push(field.into());
                issues.push(Issue::new(
                    IssueKind::CrossReference,
                    at,
                    format!(
                        "template {} in step {i} {field} does not match any inputSchema property; {}",
                        token.literal,
                        describe_properties(properties)
                    ),
                ));
            }
        }

        if let ActionStep::Condition { then, otherwise, .. } = step {
            path.push("then".into());
            check_steps(then, properties, path, issues);
            path.pop();
            if let Some(otherwise) = otherwise {
                path.push("else".into());
                check_steps(otherwise, properties, path, issues);
                path.pop();
            }
        }

        path.pop();
    }
}

fn describe_properties(properties: &BTreeSet<&str>) -> String {
    if properties.is_empty() {
        "inputSchema declares no properties".to_string()
    } else {
        let names: Vec<&str> = properties.iter().copied().collect();
        format!("valid properties: {}", names.join(", "))
    }
}
