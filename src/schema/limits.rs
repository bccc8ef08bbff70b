//! Documented bounds on submitted tools and configs.
//!
//! Exceeding any of these is a validation failure. Values are never
//! truncated.

// String lengths, in characters
pub const MAX_TOOL_NAME_LEN: usize = 64;
pub const MAX_TOOL_DESCRIPTION_LEN: usize = 1000;
pub const MAX_ANNOTATION_KEY_LEN: usize = 64;
pub const MAX_ANNOTATION_VALUE_LEN: usize = 500;
pub const MAX_CONTRIBUTOR_LEN: usize = 100;
pub const MAX_SELECTOR_LEN: usize = 500;
pub const MAX_FIELD_NAME_LEN: usize = 100;
pub const MAX_FIELD_DESCRIPTION_LEN: usize = 500;
pub const MAX_OPTION_TEXT_LEN: usize = 200;
pub const MAX_DEFAULT_VALUE_LEN: usize = 1000;
pub const MAX_STEP_URL_LEN: usize = 2000;
pub const MAX_STEP_VALUE_LEN: usize = 1000;
pub const MAX_SCRIPT_LEN: usize = 5000;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONFIG_DESCRIPTION_LEN: usize = 2000;
pub const MAX_TAG_LEN: usize = 50;
pub const MAX_DOMAIN_LEN: usize = 253;
pub const MAX_URL_PATTERN_LEN: usize = 500;

// Array counts
pub const MAX_TOOLS: usize = 100;
pub const MAX_PROPERTIES: usize = 50;
pub const MAX_ANNOTATIONS: usize = 20;
pub const MAX_FIELDS: usize = 50;
pub const MAX_OPTIONS: usize = 100;
pub const MAX_STEPS: usize = 50;
pub const MAX_TAGS: usize = 20;

// Recursion
pub const MAX_CONDITION_DEPTH: usize = 3;
pub const MAX_TOTAL_STEPS: usize = 200;

// Timings, in milliseconds
pub const MAX_TIMEOUT_MS: u64 = 30_000;

/// Caps applied during validation.
///
/// The count and recursion caps can be overridden from settings; string
/// lengths are fixed at the constants above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_tools: usize,
    pub max_properties: usize,
    pub max_annotations: usize,
    pub max_fields: usize,
    pub max_options: usize,
    /// Steps in any one list (`steps`, `then`, `else`).
    pub max_steps: usize,
    pub max_tags: usize,
    /// Deepest allowed `condition` nesting below the top-level step list.
    pub max_condition_depth: usize,
    /// Step nodes across a whole tool, nested ones included.
    pub max_total_steps: usize,
    pub max_timeout_ms: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_tools: MAX_TOOLS,
            max_properties: MAX_PROPERTIES,
            max_annotations: MAX_ANNOTATIONS,
            max_fields: MAX_FIELDS,
            max_options: MAX_OPTIONS,
            max_steps: MAX_STEPS,
            max_tags: MAX_TAGS,
            max_condition_depth: MAX_CONDITION_DEPTH,
            max_total_steps: MAX_TOTAL_STEPS,
            max_timeout_ms: MAX_TIMEOUT_MS,
        }
    }
}
