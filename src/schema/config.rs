//! Config submissions: normalization, shape, and tool-name uniqueness.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::ConfigInput;
use super::issue::{IssueKind, ValidationErrors};
use super::limits::*;
use super::structural::{Walker, get, value_kind};
use super::ValidationLimits;
use crate::pattern::{pattern_defect, strip_scheme};

/// Lowercase a domain and drop a leading `www.`.
pub fn normalize_domain(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Reduce a URL pattern to `domain/path` form.
///
/// Drops any scheme and leading `www.`, lowercases the host, and strips
/// trailing slashes. The path keeps its case; matching ignores it anyway.
pub fn normalize_url_pattern(raw: &str) -> String {
    let without_scheme = strip_scheme(raw.trim());
    let (host, path) = match without_scheme.find('/') {
        Some(idx) => without_scheme.split_at(idx),
        None => (without_scheme, ""),
    };
    let host = normalize_domain(host);
    let path = path.trim_end_matches('/');
    format!("{host}{path}")
}

/// Validate a config candidate with default limits.
pub fn validate_config(candidate: &Value) -> Result<ConfigInput, ValidationErrors> {
    validate_config_with(candidate, &ValidationLimits::default())
}

/// Validate a config candidate, including every tool it carries.
pub fn validate_config_with(
    candidate: &Value,
    limits: &ValidationLimits,
) -> Result<ConfigInput, ValidationErrors> {
    let mut walker = Walker::new(limits);
    let config = walk_config(&mut walker, candidate);
    walker.finish(config)
}

fn walk_config(w: &mut Walker<'_>, value: &Value) -> Option<ConfigInput> {
    let obj = w.object(value, "config")?;

    let domain = walk_domain(w, obj);
    let url_pattern = walk_url_pattern(w, obj, domain.as_deref());
    let title = w.required_string(obj, "title", MAX_TITLE_LEN, true);
    let description = w
        .optional_string(obj, "description", MAX_CONFIG_DESCRIPTION_LEN)
        .unwrap_or_default();
    let tags = match get(obj, "tags") {
        Some(v) => w.nested("tags", |w| walk_tags(w, v)),
        None => Some(Vec::new()),
    };
    let tools = match get(obj, "tools") {
        Some(v) => w.nested("tools", |w| walk_tools(w, v)),
        None => Some(Vec::new()),
    };

    Some(ConfigInput {
        domain: domain?,
        url_pattern: url_pattern?,
        title: title?,
        description,
        tags: tags?,
        tools: tools?,
    })
}

fn walk_domain(w: &mut Walker<'_>, obj: &Map<String, Value>) -> Option<String> {
    let raw = w.required_string(obj, "domain", MAX_DOMAIN_LEN, true)?;
    let domain = normalize_domain(&raw);
    if domain.is_empty() || domain.contains('/') || domain.chars().any(char::is_whitespace) {
        w.issue_at(
            "domain",
            IssueKind::Structural,
            format!("\"{raw}\" is not a bare host name"),
        );
        return None;
    }
    Some(domain)
}

fn walk_url_pattern(
    w: &mut Walker<'_>,
    obj: &Map<String, Value>,
    domain: Option<&str>,
) -> Option<String> {
    let raw = w.required_string(obj, "urlPattern", MAX_URL_PATTERN_LEN, true)?;
    let pattern = normalize_url_pattern(&raw);
    // Without a usable domain there is nothing to check the scope against.
    let domain = domain?;

    let in_scope = pattern == domain
        || pattern
            .strip_prefix(domain)
            .is_some_and(|rest| rest.starts_with('/'));
    if !in_scope {
        w.issue_at(
            "urlPattern",
            IssueKind::Structural,
            format!("\"{pattern}\" is not scoped to domain \"{domain}\""),
        );
        return None;
    }
    if let Some(defect) = pattern_defect(&pattern, domain) {
        w.issue_at("urlPattern", IssueKind::Structural, defect);
        return None;
    }
    Some(pattern)
}

fn walk_tags(w: &mut Walker<'_>, value: &Value) -> Option<Vec<String>> {
    let items = w.array(value, w.limits().max_tags)?;
    let before = w.issue_count();
    let mut tags = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(tag) if tag.trim().is_empty() => {
                w.issue_at(i, IssueKind::Structural, "must not be empty");
            }
            Some(tag) if tag.chars().count() > MAX_TAG_LEN => {
                w.issue_at(
                    i,
                    IssueKind::BoundsExceeded,
                    format!("exceeds maximum length of {MAX_TAG_LEN} characters"),
                );
            }
            Some(tag) => tags.push(tag.to_string()),
            None => w.issue_at(
                i,
                IssueKind::Structural,
                format!("must be a string, got {}", value_kind(item)),
            ),
        }
    }
    (w.issue_count() == before).then_some(tags)
}

fn walk_tools(w: &mut Walker<'_>, value: &Value) -> Option<Vec<crate::schema::ToolDescriptor>> {
    let items = w.array(value, w.limits().max_tools)?;

    let tools: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(i, item)| w.nested(i, |w| w.tool(item)))
        .collect();

    let duplicates_found = report_duplicate_names(w, items);
    let tools: Option<Vec<_>> = tools.into_iter().collect();
    if duplicates_found { None } else { tools }
}

/// Flag every occurrence of a name shared by two or more entries.
///
/// Works on the raw `name` strings so duplicates are caught even among
/// entries that failed validation for other reasons.
fn report_duplicate_names(w: &mut Walker<'_>, items: &[Value]) -> bool {
    let mut positions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(name) = item.get("name").and_then(Value::as_str) {
            positions.entry(name).or_default().push(i);
        }
    }

    let mut found = false;
    for (name, indices) in positions.iter().filter(|(_, idx)| idx.len() > 1) {
        found = true;
        for &i in indices {
            let others: Vec<String> = indices
                .iter()
                .filter(|&&j| j != i)
                .map(usize::to_string)
                .collect();
            w.nested(i, |w| {
                w.issue_at(
                    "name",
                    IssueKind::DuplicateName,
                    format!(
                        "duplicate tool name \"{name}\" (also at index {})",
                        others.join(", ")
                    ),
                )
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn tool(name: &str) -> Value {
        json!({
            "name": name,
            "description": "A tool",
            "inputSchema": { "type": "object", "properties": {} }
        })
    }

    fn config(tools: Vec<Value>) -> Value {
        json!({
            "domain": "Example.com",
            "urlPattern": "https://www.example.com/search/",
            "title": "Search tools",
            "tools": tools
        })
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("  WWW.Example.COM "), "example.com");
        assert_eq!(normalize_domain("sub.example.com"), "sub.example.com");
    }

    #[test]
    fn test_normalize_url_pattern() {
        assert_eq!(normalize_url_pattern("https://www.Example.com/Admin/"), "example.com/Admin");
        assert_eq!(normalize_url_pattern("example.com/"), "example.com");
        assert_eq!(normalize_url_pattern("example.com"), "example.com");
        assert_eq!(normalize_url_pattern("http://example.com/a/**"), "example.com/a/**");
    }

    #[test]
    fn test_valid_config_is_normalized() {
        let parsed = validate_config(&config(vec![tool("search")])).unwrap();
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.url_pattern, "example.com/search");
        assert_eq!(parsed.tools.len(), 1);
        assert!(parsed.description.is_empty());
    }

    #[test]
    fn test_accepted_config_validates_again() {
        let candidate = json!({
            "domain": "example.com",
            "urlPattern": "example.com/search",
            "title": "Search tools"
        });
        let parsed = validate_config(&candidate).unwrap();
        let serialized = serde_json::to_value(&parsed).unwrap();
        assert_eq!(serialized["description"], json!(""));
        assert_eq!(validate_config(&serialized).unwrap(), parsed);
    }

    #[test]
    fn test_duplicate_names_flag_every_occurrence() {
        let err = validate_config(&config(vec![tool("search"), tool("other"), tool("search")]))
            .unwrap_err();
        let dupes: Vec<String> = err
            .of_kind(IssueKind::DuplicateName)
            .map(|issue| issue.path_string())
            .collect();
        assert_eq!(dupes, vec!["tools[0].name", "tools[2].name"]);
        assert!(err.issues()[0].message.contains("also at index 2"));
    }

    #[test]
    fn test_tool_issues_are_prefixed() {
        let mut bad = tool("search");
        bad["inputSchema"]["properties"] = json!({ "q": "string" });
        let err = validate_config(&config(vec![tool("ok"), bad])).unwrap_err();
        assert!(err.has_issue_at("tools[1].inputSchema.properties.q"));
    }

    #[test]
    fn test_pattern_must_sit_under_domain() {
        let mut candidate = config(vec![]);
        candidate["urlPattern"] = json!("other.com/search");
        let err = validate_config(&candidate).unwrap_err();
        assert!(err.has_issue_at("urlPattern"));

        candidate["urlPattern"] = json!("example.community/search");
        assert!(validate_config(&candidate).is_err());
    }

    #[test]
    fn test_misplaced_wildcard_rejected() {
        let mut candidate = config(vec![]);
        candidate["urlPattern"] = json!("example.com/**/edit");
        let err = validate_config(&candidate).unwrap_err();
        assert!(err.issues()[0].message.contains("final segment"));
    }

    #[test]
    fn test_tool_count_bound() {
        let limits = ValidationLimits {
            max_tools: 1,
            ..ValidationLimits::default()
        };
        let err = validate_config_with(&config(vec![tool("a"), tool("b")]), &limits).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::BoundsExceeded);
        assert!(err.has_issue_at("tools"));
    }

    #[test]
    fn test_step_budget_is_per_tool() {
        let limits = ValidationLimits {
            max_total_steps: 2,
            ..ValidationLimits::default()
        };
        let with_steps = |name: &str| {
            let mut t = tool(name);
            t["execution"] = json!({
                "selector": "form", "autosubmit": false,
                "steps": [{ "action": "scroll" }, { "action": "scroll" }]
            });
            t
        };
        let parsed =
            validate_config_with(&config(vec![with_steps("a"), with_steps("b")]), &limits).unwrap();
        assert_eq!(parsed.tools.len(), 2);
    }

    #[test]
    fn test_tags_and_title() {
        let mut candidate = config(vec![]);
        candidate["title"] = json!("");
        candidate["tags"] = json!(["search", "x".repeat(MAX_TAG_LEN + 1), 3]);
        let err = validate_config(&candidate).unwrap_err();
        assert!(err.has_issue_at("title"));
        assert!(err.has_issue_at("tags[1]"));
        assert!(err.has_issue_at("tags[2]"));
    }

    #[test]
    fn test_domain_with_path_rejected() {
        let mut candidate = config(vec![]);
        candidate["domain"] = json!("example.com/search");
        let err = validate_config(&candidate).unwrap_err();
        assert!(err.has_issue_at("domain"));
    }
}
