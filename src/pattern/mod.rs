//! URL pattern matching for site configs.
//!
//! A pattern is a normalized `domain/path` string whose path segments are
//! one of:
//! - a static segment (`admin`), matched case-insensitively, worth 3 points
//! - a dynamic segment (`:id`), matching any single segment, worth 2 points
//! - a trailing wildcard (`**`), matching any remainder, worth 0 points
//!
//! A pattern with no path (`example.com`) is the domain-only fallback: it
//! matches every URL with score 0.
//!
//! The 3/2/0 weights are published to contributors, so the ordering they
//! produce must stay stable.

pub mod ranker;

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use ranker::{Patterned, Ranked, rank_by_url, rank_scored};

/// Score contributed by an exact static segment.
pub const STATIC_SEGMENT_SCORE: u32 = 3;

/// Score contributed by a `:param` segment.
pub const DYNAMIC_SEGMENT_SCORE: u32 = 2;

/// Score contributed by a trailing `**`.
pub const WILDCARD_SEGMENT_SCORE: u32 = 0;

/// Trailing wildcard segment.
pub const WILDCARD: &str = "**";

/// Outcome of matching one pattern against one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub score: u32,
    /// Values captured by `:name` segments.
    pub params: BTreeMap<String, String>,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self::default()
    }

    fn domain_fallback() -> Self {
        Self {
            matched: true,
            score: 0,
            params: BTreeMap::new(),
        }
    }
}

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Static(&'a str),
    Dynamic(&'a str),
    Wildcard,
}

/// Match `pattern` against a concrete `url` on `domain`.
///
/// Never fails: a malformed pattern (`**` before the last segment, a bare
/// `:`) simply does not match.
pub fn match_pattern(pattern: &str, url: &str, domain: &str) -> MatchResult {
    let pattern_path = strip_domain_prefix(pattern, domain);
    if is_domain_only_path(pattern_path) {
        tracing::trace!(pattern = %pattern, "domain-only pattern matched as fallback");
        return MatchResult::domain_fallback();
    }

    let Some(segments) = parse_segments(pattern_path) else {
        tracing::debug!(pattern = %pattern, "malformed URL pattern never matches");
        return MatchResult::no_match();
    };

    let url_path = normalize_url_path(url);
    let url_segments: Vec<Cow<'_, str>> = split_segments(&url_path)
        .into_iter()
        .map(decode_segment)
        .collect();

    let mut score = 0;
    let mut params = BTreeMap::new();
    let mut wildcard = false;

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Wildcard => {
                score += WILDCARD_SEGMENT_SCORE;
                wildcard = true;
                break;
            }
            Segment::Dynamic(name) => {
                let Some(value) = url_segments.get(i) else {
                    return MatchResult::no_match();
                };
                params.insert((*name).to_string(), value.to_string());
                score += DYNAMIC_SEGMENT_SCORE;
            }
            Segment::Static(expected) => match url_segments.get(i) {
                Some(actual) if segments_equal(actual, expected) => {
                    score += STATIC_SEGMENT_SCORE;
                }
                _ => return MatchResult::no_match(),
            },
        }
    }

    if !wildcard && url_segments.len() > segments.len() {
        return MatchResult::no_match();
    }

    tracing::trace!(pattern = %pattern, url = %url, score, "pattern matched");
    MatchResult {
        matched: true,
        score,
        params,
    }
}

/// Whether `pattern` covers its whole domain (no path, or just `/`).
pub fn is_domain_only(pattern: &str, domain: &str) -> bool {
    is_domain_only_path(strip_domain_prefix(pattern, domain))
}

fn is_domain_only_path(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Remove a leading `domain` from `pattern`, leaving its path part.
///
/// The prefix only counts when it ends at a segment boundary, so
/// `example.com` is not stripped from `example.company/x`.
pub fn strip_domain_prefix<'a>(pattern: &'a str, domain: &str) -> &'a str {
    if domain.is_empty() {
        return pattern;
    }
    let Some((head, rest)) = pattern.split_at_checked(domain.len()) else {
        return pattern;
    };
    if head.eq_ignore_ascii_case(domain) && (rest.is_empty() || rest.starts_with('/')) {
        rest
    } else {
        pattern
    }
}

/// Reduce a URL to its path, without query, fragment or trailing slash.
///
/// Full URLs are parsed with the `url` crate. Anything else has a leading
/// `scheme://` removed and keeps everything from the first `/`. The root
/// path is returned as `/`.
pub fn normalize_url_path(url: &str) -> String {
    let trimmed = url.trim();

    let path = match url::Url::parse(trimmed) {
        Ok(parsed) if !parsed.cannot_be_a_base() && parsed.host_str().is_some() => {
            parsed.path().to_string()
        }
        _ => {
            let without_scheme = strip_scheme(trimmed);
            let without_suffix = without_scheme
                .split(['?', '#'])
                .next()
                .unwrap_or_default();
            match without_suffix.find('/') {
                Some(idx) => without_suffix[idx..].to_string(),
                None => "/".to_string(),
            }
        }
    };

    let stripped = path.trim_end_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}

/// Drop a leading `scheme://` if present.
pub(crate) fn strip_scheme(value: &str) -> &str {
    let Some(idx) = value.find("://") else {
        return value;
    };
    let scheme = &value[..idx];
    let looks_like_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if looks_like_scheme {
        &value[idx + 3..]
    } else {
        value
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Percent-decode one path segment. Segments that do not decode to UTF-8
/// are kept as written.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

/// Case-insensitive comparison of a decoded URL segment with a static
/// pattern segment.
fn segments_equal(actual: &str, expected: &str) -> bool {
    actual.to_lowercase() == decode_segment(expected).to_lowercase()
}

/// Parse a pattern path, returning `None` when it can never match.
fn parse_segments(path: &str) -> Option<Vec<Segment<'_>>> {
    let raw = split_segments(path);
    let last = raw.len().saturating_sub(1);
    let mut segments = Vec::with_capacity(raw.len());

    for (i, segment) in raw.into_iter().enumerate() {
        if segment == WILDCARD {
            if i != last {
                return None;
            }
            segments.push(Segment::Wildcard);
        } else if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return None;
            }
            segments.push(Segment::Dynamic(name));
        } else {
            segments.push(Segment::Static(segment));
        }
    }

    Some(segments)
}

/// Check a pattern path for defects that would make it never match.
///
/// Returns a human-readable reason, or `None` if the pattern is usable.
pub fn pattern_defect(pattern: &str, domain: &str) -> Option<String> {
    let path = strip_domain_prefix(pattern, domain);
    let raw = split_segments(path);
    let last = raw.len().saturating_sub(1);
    for (i, segment) in raw.iter().enumerate() {
        if *segment == WILDCARD && i != last {
            return Some(format!(
                "\"{WILDCARD}\" may only appear as the final segment (found at segment {i})"
            ));
        }
        if *segment == ":" {
            return Some(format!("segment {i} is a bare \":\" with no parameter name"));
        }
    }
    None
}
