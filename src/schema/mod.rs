//! Tool and config schemas.
//!
//! Candidates arrive as untyped JSON from a transport. Validation walks the
//! candidate once for shape and bounds, then runs a
//! separate relational pass ([`cross_ref`]) over each structurally valid
//! tool, so the two kinds of error never share a message. Every issue is
//! collected; nothing fails fast.
//!
//! # Example tool
//!
//! ```json
//! {
//!   "name": "search-products",
//!   "description": "Search the catalogue",
//!   "inputSchema": {
//!     "type": "object",
//!     "properties": { "query": { "type": "string" } },
//!     "required": ["query"]
//!   },
//!   "execution": {
//!     "selector": "form#search",
//!     "autosubmit": true,
//!     "fields": [
//!       { "type": "text", "selector": "input[name=q]", "name": "query", "description": "Search terms" }
//!     ],
//!     "resultSelector": ".results",
//!     "resultExtract": "list"
//!   }
//! }
//! ```

pub mod config;
pub mod cross_ref;
pub mod issue;
pub mod limits;
mod structural;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use config::{normalize_domain, normalize_url_pattern, validate_config, validate_config_with};
pub use issue::{Issue, IssueKind, PathSegment, ValidationErrors};
pub use limits::ValidationLimits;

/// A named, schema-described capability with optional execution metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Restricted JSON-Schema object; always `"type": "object"` once validated.
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
}

impl ToolDescriptor {
    /// Keys of `inputSchema.properties`.
    pub fn property_names(&self) -> BTreeSet<&str> {
        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether this tool carries execution metadata.
    pub fn is_executable(&self) -> bool {
        self.execution.is_some()
    }
}

/// Selector-based metadata describing how a runtime performs a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDescriptor {
    /// Form or container the tool operates on.
    pub selector: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ToolField>,
    pub autosubmit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_action: Option<SubmitAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_extract: Option<ResultExtract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ActionStep>,
    /// Milliseconds to wait before reading the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_wait_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_required: Option<bool>,
}

/// How a form is submitted when `autosubmit` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    Click,
    Enter,
}

impl SubmitAction {
    pub const ALL: &'static [(&'static str, Self)] = &[("click", Self::Click), ("enter", Self::Enter)];
}

/// How the result element is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultExtract {
    Text,
    Html,
    Attribute,
    Table,
    List,
}

impl ResultExtract {
    pub const ALL: &'static [(&'static str, Self)] = &[
        ("text", Self::Text),
        ("html", Self::Html),
        ("attribute", Self::Attribute),
        ("table", Self::Table),
        ("list", Self::List),
    ];
}

/// One form input bound to an `inputSchema` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolField {
    pub selector: String,
    /// Must name a key of `inputSchema.properties`.
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Closed set of field input types, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Select { options: Vec<FieldOption> },
    Checkbox,
    /// Every option carries its own selector.
    Radio { options: Vec<FieldOption> },
    Date,
    Hidden,
}

impl FieldKind {
    pub const TYPES: &'static [&'static str] = &[
        "text", "number", "textarea", "select", "checkbox", "radio", "date", "hidden",
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select { .. } => "select",
            Self::Checkbox => "checkbox",
            Self::Radio { .. } => "radio",
            Self::Date => "date",
            Self::Hidden => "hidden",
        }
    }
}

/// A choice of a `select` or `radio` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// Scalar pre-filled into a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

/// Element state a `wait` or `condition` step checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl ElementState {
    pub const ALL: &'static [(&'static str, Self)] = &[
        ("visible", Self::Visible),
        ("hidden", Self::Hidden),
        ("attached", Self::Attached),
        ("detached", Self::Detached),
    ];
}

/// One step of a multi-step execution, tagged by `action`.
///
/// `condition` nests further step lists; validation bounds both its depth
/// and the total number of step nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ActionStep {
    Navigate {
        url: String,
    },
    Click {
        selector: String,
    },
    Fill {
        selector: String,
        value: String,
    },
    Select {
        selector: String,
        value: String,
    },
    Wait {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<ElementState>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },
    Extract {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
    Scroll {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    Evaluate {
        script: String,
    },
    Condition {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<ElementState>,
        then: Vec<ActionStep>,
        #[serde(
            rename = "else",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        otherwise: Option<Vec<ActionStep>>,
    },
}

impl ActionStep {
    pub const ACTIONS: &'static [&'static str] = &[
        "navigate", "click", "fill", "select", "wait", "extract", "scroll", "evaluate",
        "condition",
    ];

    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::Click { .. } => "click",
            Self::Fill { .. } => "fill",
            Self::Select { .. } => "select",
            Self::Wait { .. } => "wait",
            Self::Extract { .. } => "extract",
            Self::Scroll { .. } => "scroll",
            Self::Evaluate { .. } => "evaluate",
            Self::Condition { .. } => "condition",
        }
    }

    /// String fields that may carry `{{token}}` templates, by wire name.
    pub fn template_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Navigate { url } => vec![("url", url.as_str())],
            Self::Fill { selector, value } | Self::Select { selector, value } => {
                vec![("selector", selector.as_str()), ("value", value.as_str())]
            }
            Self::Click { selector }
            | Self::Wait { selector, .. }
            | Self::Extract { selector, .. }
            | Self::Condition { selector, .. } => vec![("selector", selector.as_str())],
            Self::Scroll { selector } => selector
                .as_deref()
                .map(|s| vec![("selector", s)])
                .unwrap_or_default(),
            Self::Evaluate { .. } => Vec::new(),
        }
    }
}

/// A config submission before the caller adds identity and versioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInput {
    /// Lowercase, without `www.`.
    pub domain: String,
    /// `domain/path`, no scheme, no trailing slash.
    pub url_pattern: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Validate a tool candidate with default limits.
pub fn validate_tool(candidate: &Value) -> Result<ToolDescriptor, ValidationErrors> {
    validate_tool_with(candidate, &ValidationLimits::default())
}

/// Validate a tool candidate: structure first, then cross-references.
pub fn validate_tool_with(
    candidate: &Value,
    limits: &ValidationLimits,
) -> Result<ToolDescriptor, ValidationErrors> {
    let mut walker = structural::Walker::new(limits);
    let tool = walker.tool(candidate);
    walker.finish(tool)
}
