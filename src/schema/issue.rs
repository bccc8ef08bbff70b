//! Validation issues with structured paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step of a path into a candidate value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Which rule an issue violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Wrong or missing discriminant, missing field, wrong JSON type.
    Structural,
    /// An execution field or `{{token}}` names a property the schema lacks.
    CrossReference,
    /// Two tools in one config share a name.
    DuplicateName,
    /// A string or array is over its documented cap.
    BoundsExceeded,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Structural => "structural",
            Self::CrossReference => "cross_reference",
            Self::DuplicateName => "duplicate_name",
            Self::BoundsExceeded => "bounds_exceeded",
        };
        f.write_str(s)
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub message: String,
    pub kind: IssueKind,
}

impl Issue {
    pub fn new(kind: IssueKind, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            kind,
        }
    }

    /// Prepend `prefix` to this issue's path.
    pub fn with_prefix(mut self, prefix: &[PathSegment]) -> Self {
        let mut path = prefix.to_vec();
        path.append(&mut self.path);
        self.path = path;
        self
    }

    /// Dotted rendering of the path, e.g. `tools[1].execution.fields[0].name`.
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path_string(), self.message)
        }
    }
}

/// Render a path as `a.b[0].c`.
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(i) => {
                out.push_str(&format!("[{i}]"));
            }
        }
    }
    out
}

/// Every issue found in a rejected candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation issue(s): {}", .issues.len(), render_issues(.issues))]
pub struct ValidationErrors {
    issues: Vec<Issue>,
}

fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of one kind.
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    /// Whether any issue sits exactly at `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path_string() == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path() {
        let path = vec![
            PathSegment::from("tools"),
            PathSegment::from(1),
            PathSegment::from("execution"),
            PathSegment::from("fields"),
            PathSegment::from(0),
            PathSegment::from("name"),
        ];
        assert_eq!(format_path(&path), "tools[1].execution.fields[0].name");
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn test_with_prefix() {
        let issue = Issue::new(IssueKind::Structural, vec!["name".into()], "missing")
            .with_prefix(&["tools".into(), 2.into()]);
        assert_eq!(issue.path_string(), "tools[2].name");
        assert_eq!(issue.to_string(), "tools[2].name: missing");
    }

    #[test]
    fn test_path_serializes_as_mixed_array() {
        let issue = Issue::new(
            IssueKind::DuplicateName,
            vec!["tools".into(), 3.into(), "name".into()],
            "dup",
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], serde_json::json!(["tools", 3, "name"]));
        assert_eq!(json["kind"], "duplicate_name");
    }

    #[test]
    fn test_errors_display_lists_every_issue() {
        let errors = ValidationErrors::new(vec![
            Issue::new(IssueKind::Structural, vec!["a".into()], "first"),
            Issue::new(IssueKind::BoundsExceeded, vec!["b".into()], "second"),
        ]);
        let rendered = errors.to_string();
        assert!(rendered.starts_with("2 validation issue(s)"));
        assert!(rendered.contains("a: first"));
        assert!(rendered.contains("b: second"));
        assert_eq!(errors.of_kind(IssueKind::BoundsExceeded).count(), 1);
    }
}
