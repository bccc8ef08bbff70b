//! Shape and bounds validation over untyped JSON candidates.
//!
//! The walker visits every part of a candidate even after finding problems,
//! recording each one against its path. Typed values are only assembled
//! when the part they cover produced no issues.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::cross_ref;
use super::issue::{Issue, IssueKind, PathSegment, ValidationErrors};
use super::limits::*;
use super::{
    ActionStep, DefaultValue, ElementState, ExecutionDescriptor, FieldKind, FieldOption,
    ResultExtract, SubmitAction, ToolDescriptor, ToolField, ValidationLimits,
};

/// JSON type name used in messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Look up `key`, treating an explicit `null` as absent.
pub(crate) fn get<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Lowercase letters and digits in groups joined by single hyphens.
pub(crate) fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

/// Collects issues while walking a candidate.
pub(crate) struct Walker<'l> {
    limits: &'l ValidationLimits,
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
    step_nodes: usize,
    step_budget_reported: bool,
}

impl<'l> Walker<'l> {
    pub(crate) fn new(limits: &'l ValidationLimits) -> Self {
        Self {
            limits,
            path: Vec::new(),
            issues: Vec::new(),
            step_nodes: 0,
            step_budget_reported: false,
        }
    }

    pub(crate) fn limits(&self) -> &'l ValidationLimits {
        self.limits
    }

    pub(crate) fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Turn the walk into a result: the value only if nothing was recorded.
    pub(crate) fn finish<T>(mut self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => {
                if self.issues.is_empty() {
                    self.issue(IssueKind::Structural, "invalid value");
                }
                tracing::debug!(issues = self.issues.len(), "candidate rejected");
                Err(ValidationErrors::new(self.issues))
            }
        }
    }

    /// Record an issue at the current path.
    pub(crate) fn issue(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.issues
            .push(Issue::new(kind, self.path.clone(), message));
    }

    /// Record an issue one segment below the current path.
    pub(crate) fn issue_at(
        &mut self,
        segment: impl Into<PathSegment>,
        kind: IssueKind,
        message: impl Into<String>,
    ) {
        let segment = segment.into();
        self.nested(segment, |w| w.issue(kind, message));
    }

    /// Record issues whose paths are relative to the current path.
    pub(crate) fn extend_relative(&mut self, issues: Vec<Issue>) {
        let prefix = self.path.clone();
        self.issues
            .extend(issues.into_iter().map(|issue| issue.with_prefix(&prefix)));
    }

    /// Run `f` one segment deeper.
    pub(crate) fn nested<R>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    // ── Primitive helpers ──────────────────────────────────────────────

    pub(crate) fn object<'v>(
        &mut self,
        value: &'v Value,
        what: &str,
    ) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.issue(
                    IssueKind::Structural,
                    format!("{what} must be an object, got {}", value_kind(value)),
                );
                None
            }
        }
    }

    fn check_length(&mut self, key: &str, value: &str, max: usize) -> bool {
        let len = value.chars().count();
        if len > max {
            self.issue_at(
                key,
                IssueKind::BoundsExceeded,
                format!("exceeds maximum length of {max} characters (got {len})"),
            );
            false
        } else {
            true
        }
    }

    fn string_value(
        &mut self,
        key: &str,
        value: &Value,
        max: usize,
        non_empty: bool,
    ) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.issue_at(
                key,
                IssueKind::Structural,
                format!("must be a string, got {}", value_kind(value)),
            );
            return None;
        };
        if non_empty && s.trim().is_empty() {
            self.issue_at(key, IssueKind::Structural, "must not be empty");
            return None;
        }
        self.check_length(key, s, max).then(|| s.to_string())
    }

    pub(crate) fn required_string(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        max: usize,
        non_empty: bool,
    ) -> Option<String> {
        match get(obj, key) {
            Some(value) => self.string_value(key, value, max, non_empty),
            None => {
                self.issue_at(key, IssueKind::Structural, "missing required field");
                None
            }
        }
    }

    /// An optional string may be empty; only its length is bounded.
    pub(crate) fn optional_string(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        max: usize,
    ) -> Option<String> {
        get(obj, key).and_then(|value| self.string_value(key, value, max, false))
    }

    fn required_bool(&mut self, obj: &Map<String, Value>, key: &str) -> Option<bool> {
        match get(obj, key) {
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                self.issue_at(
                    key,
                    IssueKind::Structural,
                    format!("must be a boolean, got {}", value_kind(other)),
                );
                None
            }
            None => {
                self.issue_at(key, IssueKind::Structural, "missing required field");
                None
            }
        }
    }

    fn optional_bool(&mut self, obj: &Map<String, Value>, key: &str) -> Option<bool> {
        get(obj, key)?;
        self.required_bool(obj, key)
    }

    fn optional_millis(&mut self, obj: &Map<String, Value>, key: &str) -> Option<u64> {
        let value = get(obj, key)?;
        let Some(ms) = value.as_u64() else {
            self.issue_at(
                key,
                IssueKind::Structural,
                "must be a non-negative integer number of milliseconds",
            );
            return None;
        };
        let max = self.limits.max_timeout_ms;
        if ms > max {
            self.issue_at(
                key,
                IssueKind::BoundsExceeded,
                format!("must be at most {max} ms (got {ms})"),
            );
            return None;
        }
        Some(ms)
    }

    fn optional_enum<T: Copy>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        table: &[(&str, T)],
    ) -> Option<T> {
        let value = get(obj, key)?;
        let found = value
            .as_str()
            .and_then(|s| table.iter().find(|(name, _)| *name == s))
            .map(|(_, v)| *v);
        if found.is_none() {
            let names: Vec<&str> = table.iter().map(|(name, _)| *name).collect();
            self.issue_at(
                key,
                IssueKind::Structural,
                format!("must be one of: {}", names.join(", ")),
            );
        }
        found
    }

    /// An array of at most `max` entries. Over-long arrays are not walked.
    pub(crate) fn array<'v>(&mut self, value: &'v Value, max: usize) -> Option<&'v Vec<Value>> {
        let Some(items) = value.as_array() else {
            self.issue(
                IssueKind::Structural,
                format!("must be an array, got {}", value_kind(value)),
            );
            return None;
        };
        if items.len() > max {
            self.issue(
                IssueKind::BoundsExceeded,
                format!("has {} entries; maximum is {max}", items.len()),
            );
            return None;
        }
        Some(items)
    }

    /// Read a string discriminant such as `type` or `action`.
    fn discriminant<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        allowed: &[&str],
    ) -> Option<&'v str> {
        match get(obj, key) {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                self.issue_at(
                    key,
                    IssueKind::Structural,
                    format!("discriminant must be a string, got {}", value_kind(other)),
                );
                None
            }
            None => {
                self.issue_at(
                    key,
                    IssueKind::Structural,
                    format!(
                        "missing required discriminant \"{key}\" (one of: {})",
                        allowed.join(", ")
                    ),
                );
                None
            }
        }
    }

    // ── Tool ───────────────────────────────────────────────────────────

    /// Validate one tool, then cross-check it if its structure is sound.
    pub(crate) fn tool(&mut self, value: &Value) -> Option<ToolDescriptor> {
        let before = self.issue_count();
        // The step budget applies per tool.
        self.step_nodes = 0;
        self.step_budget_reported = false;
        let obj = self.object(value, "tool")?;

        let name = self.tool_name(obj);
        let description = self.required_string(obj, "description", MAX_TOOL_DESCRIPTION_LEN, true);
        let input_schema = match get(obj, "inputSchema") {
            Some(schema) => self.nested("inputSchema", |w| w.input_schema(schema)),
            None => {
                self.issue_at("inputSchema", IssueKind::Structural, "missing required field");
                None
            }
        };
        let annotations = self.annotations(obj);
        let execution = match get(obj, "execution") {
            Some(exec) => self.nested("execution", |w| w.execution(exec)).map(Some),
            None => Some(None),
        };
        let contributor = self.optional_string(obj, "contributor", MAX_CONTRIBUTOR_LEN);

        if self.issue_count() != before {
            return None;
        }

        let tool = ToolDescriptor {
            name: name?,
            description: description?,
            input_schema: input_schema?,
            annotations,
            execution: execution?,
            contributor,
        };

        let relational = cross_ref::check_tool(&tool);
        self.extend_relative(relational);
        Some(tool)
    }

    fn tool_name(&mut self, obj: &Map<String, Value>) -> Option<String> {
        let name = self.required_string(obj, "name", MAX_TOOL_NAME_LEN, true)?;
        if !is_kebab_case(&name) {
            self.issue_at(
                "name",
                IssueKind::Structural,
                format!(
                    "\"{name}\" must be kebab-case (lowercase letters and digits separated by single hyphens)"
                ),
            );
            return None;
        }
        Some(name)
    }

    fn input_schema(&mut self, value: &Value) -> Option<Value> {
        let obj = self.object(value, "inputSchema")?;
        let before = self.issue_count();

        match get(obj, "type") {
            Some(Value::String(t)) if t == "object" => {}
            Some(other) => self.issue_at(
                "type",
                IssueKind::Structural,
                format!("must be \"object\", got {other}"),
            ),
            None => self.issue_at(
                "type",
                IssueKind::Structural,
                "missing required \"type\" (must be \"object\")",
            ),
        }

        let properties = match get(obj, "properties") {
            Some(props) => self.nested("properties", |w| w.properties(props)),
            None => Some(Map::new()),
        };

        if let (Some(required), Some(props)) = (get(obj, "required"), properties.as_ref()) {
            self.nested("required", |w| w.required_keys(required, props));
        }

        (self.issue_count() == before).then(|| value.clone())
    }

    fn properties(&mut self, value: &Value) -> Option<Map<String, Value>> {
        let Some(props) = value.as_object() else {
            self.issue(
                IssueKind::Structural,
                format!("must be an object mapping property names to schemas, got {}", value_kind(value)),
            );
            return None;
        };
        let max = self.limits.max_properties;
        if props.len() > max {
            self.issue(
                IssueKind::BoundsExceeded,
                format!("declares {} properties; maximum is {max}", props.len()),
            );
            return None;
        }

        let before = self.issue_count();
        for (key, prop) in props {
            self.nested(key.as_str(), |w| w.property_schema(prop));
        }
        (self.issue_count() == before).then(|| props.clone())
    }

    fn property_schema(&mut self, prop: &Value) {
        let Some(obj) = prop.as_object() else {
            self.issue(
                IssueKind::Structural,
                format!(
                    "property schema must be an object with a \"type\" key, got {} {prop}",
                    value_kind(prop)
                ),
            );
            return;
        };
        match obj.get("type") {
            Some(Value::String(_)) => {}
            Some(Value::Array(types)) if !types.is_empty() && types.iter().all(Value::is_string) => {}
            Some(other) => self.issue_at(
                "type",
                IssueKind::Structural,
                format!("must be a type name or an array of type names, got {other}"),
            ),
            None => self.issue(IssueKind::Structural, "property schema is missing \"type\""),
        }
    }

    fn required_keys(&mut self, value: &Value, props: &Map<String, Value>) {
        let Some(items) = value.as_array() else {
            self.issue(
                IssueKind::Structural,
                format!("must be an array of property names, got {}", value_kind(value)),
            );
            return;
        };
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(key) if props.contains_key(key) => {}
                Some(key) => self.issue_at(
                    i,
                    IssueKind::Structural,
                    format!("\"{key}\" is not a declared property"),
                ),
                None => self.issue_at(
                    i,
                    IssueKind::Structural,
                    format!("must be a string, got {}", value_kind(item)),
                ),
            }
        }
    }

    fn annotations(&mut self, obj: &Map<String, Value>) -> Option<BTreeMap<String, String>> {
        let value = get(obj, "annotations")?;
        self.nested("annotations", |w| {
            let map = w.object(value, "annotations")?;
            let max = w.limits.max_annotations;
            if map.len() > max {
                w.issue(
                    IssueKind::BoundsExceeded,
                    format!("has {} entries; maximum is {max}", map.len()),
                );
                return None;
            }
            let mut out = BTreeMap::new();
            for (key, v) in map {
                if key.chars().count() > MAX_ANNOTATION_KEY_LEN {
                    w.issue_at(
                        key.as_str(),
                        IssueKind::BoundsExceeded,
                        format!("annotation key exceeds {MAX_ANNOTATION_KEY_LEN} characters"),
                    );
                    continue;
                }
                if let Some(s) = w.string_value(key, v, MAX_ANNOTATION_VALUE_LEN, false) {
                    out.insert(key.clone(), s);
                }
            }
            Some(out)
        })
    }

    // ── Execution ──────────────────────────────────────────────────────

    fn execution(&mut self, value: &Value) -> Option<ExecutionDescriptor> {
        let obj = self.object(value, "execution")?;

        let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
        let fields = match get(obj, "fields") {
            Some(v) => self.nested("fields", |w| w.fields(v)),
            None => Some(Vec::new()),
        };
        let autosubmit = self.required_bool(obj, "autosubmit");
        let submit_action = self.optional_enum(obj, "submitAction", SubmitAction::ALL);
        let submit_selector = self.optional_string(obj, "submitSelector", MAX_SELECTOR_LEN);
        let result_selector = self.optional_string(obj, "resultSelector", MAX_SELECTOR_LEN);
        let result_extract = self.optional_enum(obj, "resultExtract", ResultExtract::ALL);
        let result_attribute = self.optional_string(obj, "resultAttribute", MAX_FIELD_NAME_LEN);
        let steps = match get(obj, "steps") {
            Some(v) => self.nested("steps", |w| w.steps(v, 0)),
            None => Some(Vec::new()),
        };
        let result_delay = self.optional_millis(obj, "resultDelay");
        let result_wait_selector = self.optional_string(obj, "resultWaitSelector", MAX_SELECTOR_LEN);
        let result_required = self.optional_bool(obj, "resultRequired");

        if result_extract == Some(ResultExtract::Attribute) && get(obj, "resultAttribute").is_none() {
            self.issue_at(
                "resultAttribute",
                IssueKind::Structural,
                "required when resultExtract is \"attribute\"",
            );
        }

        Some(ExecutionDescriptor {
            selector: selector?,
            fields: fields?,
            autosubmit: autosubmit?,
            submit_action,
            submit_selector,
            result_selector,
            result_extract,
            result_attribute,
            steps: steps?,
            result_delay,
            result_wait_selector,
            result_required,
        })
    }

    fn fields(&mut self, value: &Value) -> Option<Vec<ToolField>> {
        let items = self.array(value, self.limits.max_fields)?;
        // Walk every entry before deciding, so later entries still report.
        let fields: Vec<Option<ToolField>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.nested(i, |w| w.field(item)))
            .collect();
        fields.into_iter().collect()
    }

    fn field(&mut self, value: &Value) -> Option<ToolField> {
        let obj = self.object(value, "field")?;

        let tag = self.discriminant(obj, "type", FieldKind::TYPES);
        let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
        let name = self.required_string(obj, "name", MAX_FIELD_NAME_LEN, true);
        let description = self.required_string(obj, "description", MAX_FIELD_DESCRIPTION_LEN, false);
        let required = self.optional_bool(obj, "required");
        let default_value = self.default_value(obj);

        let kind = match tag? {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "textarea" => FieldKind::Textarea,
            "checkbox" => FieldKind::Checkbox,
            "date" => FieldKind::Date,
            "hidden" => FieldKind::Hidden,
            "select" => FieldKind::Select {
                options: self.options(obj, false)?,
            },
            "radio" => FieldKind::Radio {
                options: self.options(obj, true)?,
            },
            other => {
                self.issue_at(
                    "type",
                    IssueKind::Structural,
                    format!(
                        "unknown field type \"{other}\"; expected one of: {}",
                        FieldKind::TYPES.join(", ")
                    ),
                );
                return None;
            }
        };

        Some(ToolField {
            selector: selector?,
            name: name?,
            description: description?,
            required: required.unwrap_or(false),
            default_value,
            kind,
        })
    }

    fn default_value(&mut self, obj: &Map<String, Value>) -> Option<DefaultValue> {
        match get(obj, "defaultValue")? {
            Value::Bool(b) => Some(DefaultValue::Bool(*b)),
            Value::Number(n) => Some(DefaultValue::Number(n.clone())),
            Value::String(s) => self
                .check_length("defaultValue", s, MAX_DEFAULT_VALUE_LEN)
                .then(|| DefaultValue::Text(s.clone())),
            other => {
                self.issue_at(
                    "defaultValue",
                    IssueKind::Structural,
                    format!("must be a string, number or boolean, got {}", value_kind(other)),
                );
                None
            }
        }
    }

    fn options(&mut self, obj: &Map<String, Value>, radio: bool) -> Option<Vec<FieldOption>> {
        let Some(value) = get(obj, "options") else {
            self.issue_at("options", IssueKind::Structural, "missing required field");
            return None;
        };
        self.nested("options", |w| {
            let items = w.array(value, w.limits.max_options)?;
            if radio && items.is_empty() {
                w.issue(IssueKind::Structural, "radio fields require at least one option");
                return None;
            }
            let options: Vec<Option<FieldOption>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| w.nested(i, |w| w.option(item, radio)))
                .collect();
            options.into_iter().collect()
        })
    }

    fn option(&mut self, value: &Value, radio: bool) -> Option<FieldOption> {
        let obj = self.object(value, "option")?;
        let option_value = self.required_string(obj, "value", MAX_OPTION_TEXT_LEN, false);
        let label = self.required_string(obj, "label", MAX_OPTION_TEXT_LEN, false);
        let selector = if radio {
            self.required_string(obj, "selector", MAX_SELECTOR_LEN, true)
                .map(Some)
        } else {
            Some(self.optional_string(obj, "selector", MAX_SELECTOR_LEN))
        };
        Some(FieldOption {
            value: option_value?,
            label: label?,
            selector: selector?,
        })
    }

    // ── Steps ──────────────────────────────────────────────────────────

    /// Validate a step list at `depth` condition levels below the top.
    fn steps(&mut self, value: &Value, depth: usize) -> Option<Vec<ActionStep>> {
        let items = self.array(value, self.limits.max_steps)?;
        let mut steps = Vec::with_capacity(items.len());
        let mut complete = true;

        for (i, item) in items.iter().enumerate() {
            if self.step_nodes >= self.limits.max_total_steps {
                if !self.step_budget_reported {
                    self.step_budget_reported = true;
                    let max = self.limits.max_total_steps;
                    self.issue_at(
                        i,
                        IssueKind::BoundsExceeded,
                        format!("tool declares more than {max} steps including nested condition steps"),
                    );
                }
                return None;
            }
            self.step_nodes += 1;

            match self.nested(i, |w| w.step(item, depth)) {
                Some(step) => steps.push(step),
                None => complete = false,
            }
        }

        complete.then_some(steps)
    }

    fn step(&mut self, value: &Value, depth: usize) -> Option<ActionStep> {
        let obj = self.object(value, "step")?;
        let action = self.discriminant(obj, "action", ActionStep::ACTIONS)?;

        match action {
            "navigate" => {
                let url = self.required_string(obj, "url", MAX_STEP_URL_LEN, true)?;
                Some(ActionStep::Navigate { url })
            }
            "click" => {
                let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true)?;
                Some(ActionStep::Click { selector })
            }
            "fill" | "select" => {
                let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
                let value = self.required_string(obj, "value", MAX_STEP_VALUE_LEN, false);
                let (selector, value) = (selector?, value?);
                Some(if action == "fill" {
                    ActionStep::Fill { selector, value }
                } else {
                    ActionStep::Select { selector, value }
                })
            }
            "wait" => {
                let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
                let state = self.optional_enum(obj, "state", ElementState::ALL);
                let timeout = self.optional_millis(obj, "timeout");
                Some(ActionStep::Wait {
                    selector: selector?,
                    state,
                    timeout,
                })
            }
            "extract" => {
                let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
                let attribute = self.optional_string(obj, "attribute", MAX_FIELD_NAME_LEN);
                Some(ActionStep::Extract {
                    selector: selector?,
                    attribute,
                })
            }
            "scroll" => {
                let selector = self.optional_string(obj, "selector", MAX_SELECTOR_LEN);
                Some(ActionStep::Scroll { selector })
            }
            "evaluate" => {
                let script = self.required_string(obj, "script", MAX_SCRIPT_LEN, true)?;
                Some(ActionStep::Evaluate { script })
            }
            "condition" => self.condition(obj, depth),
            other => {
                self.issue_at(
                    "action",
                    IssueKind::Structural,
                    format!(
                        "unknown action \"{other}\"; expected one of: {}",
                        ActionStep::ACTIONS.join(", ")
                    ),
                );
                None
            }
        }
    }

    fn condition(&mut self, obj: &Map<String, Value>, depth: usize) -> Option<ActionStep> {
        let selector = self.required_string(obj, "selector", MAX_SELECTOR_LEN, true);
        let state = self.optional_enum(obj, "state", ElementState::ALL);

        let max_depth = self.limits.max_condition_depth;
        if depth >= max_depth {
            self.issue(
                IssueKind::BoundsExceeded,
                format!("condition steps may nest at most {max_depth} levels deep"),
            );
            return None;
        }

        let then = match get(obj, "then") {
            Some(v) => self.nested("then", |w| w.steps(v, depth + 1)),
            None => {
                self.issue_at("then", IssueKind::Structural, "missing required field");
                None
            }
        };
        let otherwise = match get(obj, "else") {
            Some(v) => self.nested("else", |w| w.steps(v, depth + 1)).map(Some),
            None => Some(None),
        };

        Some(ActionStep::Condition {
            selector: selector?,
            state,
            then: then?,
            otherwise: otherwise?,
        })
    }
}
