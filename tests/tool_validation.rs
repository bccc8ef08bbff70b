//! Tool validation through the public API.
//!
//! Covers the structural pass and the cross-reference pass separately, and
//! checks that neither fails fast.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use webmcp_registry::schema::{
    ActionStep, FieldKind, IssueKind, ValidationLimits, validate_tool, validate_tool_with,
};

fn search_tool() -> Value {
    json!({
        "name": "search-listings",
        "description": "Search property listings",
        "inputSchema": {
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "Town or postcode" },
                "maxPrice": { "type": "number" },
                "propertyType": { "type": "string", "enum": ["house", "flat"] }
            },
            "required": ["location"]
        },
        "annotations": { "readOnlyHint": "true" },
        "execution": {
            "selector": "form#search",
            "autosubmit": true,
            "submitAction": "click",
            "submitSelector": "button[type=submit]",
            "fields": [
                { "type": "text", "selector": "#location", "name": "location", "description": "Where", "required": true },
                { "type": "number", "selector": "#max", "name": "maxPrice", "description": "Budget" },
                {
                    "type": "radio",
                    "selector": "input[name=ptype]",
                    "name": "propertyType",
                    "description": "Kind of property",
                    "options": [
                        { "value": "house", "label": "House", "selector": "#ptype-house" },
                        { "value": "flat", "label": "Flat", "selector": "#ptype-flat" }
                    ]
                }
            ],
            "steps": [
                { "action": "navigate", "url": "https://example.com/search?where={{location}}" },
                { "action": "wait", "selector": ".results", "state": "visible", "timeout": 5000 },
                {
                    "action": "condition",
                    "selector": ".cookie-banner",
                    "then": [{ "action": "click", "selector": ".cookie-banner .accept" }],
                    "else": [{ "action": "fill", "selector": "#max", "value": "{{ maxPrice }}" }]
                },
                { "action": "extract", "selector": ".results li" }
            ],
            "resultSelector": ".results",
            "resultExtract": "list",
            "resultDelay": 500
        }
    })
}

#[test]
fn realistic_tool_validates() {
    let tool = validate_tool(&search_tool()).unwrap();
    assert_eq!(tool.name, "search-listings");

    let execution = tool.execution.expect("execution kept");
    assert_eq!(execution.fields.len(), 3);
    assert!(matches!(&execution.fields[2].kind, FieldKind::Radio { options } if options.len() == 2));
    assert_eq!(execution.steps[2].action_name(), "condition");
    match &execution.steps[2] {
        ActionStep::Condition { then, otherwise, .. } => {
            assert_eq!(then.len(), 1);
            assert_eq!(otherwise.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("expected condition, got {other:?}"),
    }
}

#[test]
fn validated_tool_round_trips_through_serde() {
    let tool = validate_tool(&search_tool()).unwrap();
    let json = serde_json::to_value(&tool).unwrap();
    assert_eq!(validate_tool(&json).unwrap(), tool);
}

#[test]
fn raw_scalar_property_schemas_are_rejected() {
    for scalar in [json!(127), json!("string"), json!(true)] {
        let mut tool = search_tool();
        tool["inputSchema"]["properties"]["location"] = scalar.clone();

        let err = validate_tool(&tool).unwrap_err();
        assert!(err.has_issue_at("inputSchema.properties.location"), "{scalar}");
        assert!(err.issues().iter().all(|i| i.kind == IssueKind::Structural));
    }
}

#[test]
fn property_without_type_is_rejected() {
    let mut tool = search_tool();
    tool["inputSchema"]["properties"]["maxPrice"] = json!({ "description": "Budget" });
    let err = validate_tool(&tool).unwrap_err();
    assert!(err.has_issue_at("inputSchema.properties.maxPrice"));
}

#[test]
fn missing_top_level_type_is_rejected() {
    let mut tool = search_tool();
    tool["inputSchema"]
        .as_object_mut()
        .unwrap()
        .remove("type");
    let err = validate_tool(&tool).unwrap_err();
    assert!(err.has_issue_at("inputSchema.type"));
}

#[test]
fn unknown_field_name_lists_alternatives() {
    let mut tool = search_tool();
    tool["execution"]["fields"][1]["name"] = json!("budget");

    let err = validate_tool(&tool).unwrap_err();
    assert_eq!(err.len(), 1);
    let issue = &err.issues()[0];
    assert_eq!(issue.kind, IssueKind::CrossReference);
    assert_eq!(issue.path_string(), "execution.fields[1].name");
    assert!(issue.message.contains("\"budget\""));
    assert!(issue.message.contains("location, maxPrice, propertyType"));
}

#[test]
fn unknown_template_token_is_rejected() {
    let mut tool = search_tool();
    tool["execution"]["steps"][0]["url"] = json!("https://example.com/search?where={{town}}");

    let err = validate_tool(&tool).unwrap_err();
    assert_eq!(err.len(), 1);
    let issue = &err.issues()[0];
    assert_eq!(issue.kind, IssueKind::CrossReference);
    assert_eq!(issue.path_string(), "execution.steps[0].url");
    assert!(issue.message.contains("{{town}}"));
}

#[test]
fn cross_reference_waits_for_structural_success() {
    let mut tool = search_tool();
    tool["execution"]["fields"][1]["name"] = json!("budget");
    tool["description"] = json!("");

    let err = validate_tool(&tool).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.issues()[0].kind, IssueKind::Structural);
}

#[test]
fn every_structural_issue_is_reported() {
    let mut tool = search_tool();
    tool["name"] = json!("Search Listings");
    tool["execution"]["fields"][0]["type"] = json!("slider");
    tool["execution"]["steps"][1]["timeout"] = json!(60_000);
    tool["execution"]["autosubmit"] = json!("yes");

    let err = validate_tool(&tool).unwrap_err();
    for path in [
        "name",
        "execution.fields[0].type",
        "execution.steps[1].timeout",
        "execution.autosubmit",
    ] {
        assert!(err.has_issue_at(path), "missing issue at {path}: {err}");
    }
    assert_eq!(err.of_kind(IssueKind::BoundsExceeded).count(), 1);
}

#[test]
fn property_count_respects_limits() {
    let limits = ValidationLimits {
        max_properties: 2,
        ..ValidationLimits::default()
    };
    let err = validate_tool_with(&search_tool(), &limits).unwrap_err();
    assert!(err.has_issue_at("inputSchema.properties"));
    assert_eq!(err.issues()[0].kind, IssueKind::BoundsExceeded);
}
