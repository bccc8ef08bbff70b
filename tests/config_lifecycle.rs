//! A config from submission through updates, verification and deletion.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use webmcp_registry::merge::{VerifiedMap, merge_tools, prune_verified};
use webmcp_registry::registry::{Config, MetadataUpdate, VerificationStatus};
use webmcp_registry::schema::{IssueKind, ToolDescriptor, validate_config, validate_tool};

fn tool_json(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": { "query": { "type": "string" } }
        }
    })
}

fn executable_tool_json(name: &str) -> Value {
    let mut tool = tool_json(name, "Runs a search");
    tool["execution"] = json!({
        "selector": "form",
        "autosubmit": true,
        "fields": [{ "type": "text", "selector": "#q", "name": "query", "description": "Terms" }]
    });
    tool
}

fn tool(value: Value) -> ToolDescriptor {
    validate_tool(&value).unwrap()
}

fn submission(tools: Vec<Value>) -> Value {
    json!({
        "domain": "WWW.Shop.Example",
        "urlPattern": "https://www.shop.example/products/:id/",
        "title": "Product pages",
        "description": "Tools for product detail pages",
        "tags": ["shopping"],
        "tools": tools
    })
}

#[test]
fn duplicate_tool_names_flag_both_indices() {
    let err = validate_config(&submission(vec![
        tool_json("lookup", "first"),
        tool_json("lookup", "second"),
    ]))
    .unwrap_err();

    let paths: Vec<String> = err
        .of_kind(IssueKind::DuplicateName)
        .map(|issue| issue.path_string())
        .collect();
    assert_eq!(paths, vec!["tools[0].name", "tools[1].name"]);
}

#[test]
fn submission_becomes_versioned_record() {
    let input = validate_config(&submission(vec![tool_json("lookup", "Look up")])).unwrap();
    assert_eq!(input.domain, "shop.example");
    assert_eq!(input.url_pattern, "shop.example/products/:id");

    let config = Config::from_input(input, "alice");
    assert_eq!(config.version, 1);
    assert!(!config.has_executable_tool);
}

#[test]
fn accepted_submission_survives_a_second_validation() {
    let mut executable = executable_tool_json("search");
    executable["contributor"] = json!("");
    executable["execution"]["submitSelector"] = json!("");
    let mut raw = submission(vec![executable]);
    raw.as_object_mut().unwrap().remove("description");

    let first = validate_config(&raw).unwrap();
    let stored = serde_json::to_value(&first).unwrap();
    let second = validate_config(&stored).unwrap();
    assert_eq!(second, first);
}

#[test]
fn full_lifecycle() {
    let input = validate_config(&submission(vec![
        tool_json("lookup", "Look up"),
        tool_json("compare", "Compare"),
    ]))
    .unwrap();
    let mut config = Config::from_input(input, "alice");

    assert!(config.verify_tool("lookup"));
    assert!(config.verify_tool("compare"));
    assert_eq!(config.verification("lookup"), VerificationStatus::Verified);

    // Overwrite one tool and add an executable one
    let changed = config.apply_tools(&[
        tool(tool_json("lookup", "Look up, improved")),
        tool(executable_tool_json("search")),
    ]);
    assert!(changed);
    assert_eq!(config.version, 2);
    assert!(config.has_executable_tool);
    let names: Vec<&str> = config.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["lookup", "compare", "search"]);
    assert_eq!(config.verification("lookup"), VerificationStatus::Stale);
    assert_eq!(config.verification("compare"), VerificationStatus::Verified);
    assert_eq!(config.verification("search"), VerificationStatus::Unverified);

    // Metadata edits bump the version once
    assert!(config.update_metadata(MetadataUpdate {
        title: Some("Product detail pages".to_string()),
        ..MetadataUpdate::default()
    }));
    assert_eq!(config.version, 3);

    // Deleting prunes the verified map and recomputes the flag
    let removal = config.remove_tool("search");
    assert!(removal.removed);
    assert!(!removal.is_empty);
    assert!(!config.has_executable_tool);
    assert_eq!(config.version, 4);

    config.remove_tool("compare");
    assert!(!config.verified.contains_key("compare"));
    assert!(config.verified.keys().all(|name| config.tool(name).is_some()));

    let last = config.remove_tool("lookup");
    assert!(last.is_empty);
    assert!(config.verified.is_empty());
}

#[test]
fn merge_then_prune_keeps_verified_subset() {
    let existing = vec![tool(tool_json("a", "a")), tool(tool_json("b", "b"))];
    let mut verified = VerifiedMap::new();
    verified.insert("a".to_string(), existing[0].clone());
    verified.insert("renamed".to_string(), existing[1].clone());

    let merged = merge_tools(&existing, &[tool(tool_json("c", "c"))]);
    let pruned = prune_verified(&verified, merged.iter().map(|t| t.name.as_str()));

    assert_eq!(merged.len(), 3);
    assert_eq!(pruned.keys().collect::<Vec<_>>(), vec!["a"]);
}
