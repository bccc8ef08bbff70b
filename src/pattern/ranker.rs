//! Specificity ranking of patterned records against a URL.
//!
//! Every record is scored with [`match_pattern`]; non-matches are dropped and
//! the rest are sorted by descending score. Equal scores keep their input
//! order.

use super::{MatchResult, match_pattern};

/// A record scoped by a URL pattern.
pub trait Patterned {
    /// The normalized `domain/path` pattern of this record.
    fn url_pattern(&self) -> &str;
}

impl Patterned for String {
    fn url_pattern(&self) -> &str {
        self
    }
}

impl Patterned for &str {
    fn url_pattern(&self) -> &str {
        self
    }
}

/// A matching record together with its match details.
#[derive(Debug)]
pub struct Ranked<'a, T> {
    pub record: &'a T,
    pub result: MatchResult,
}

impl<T> Ranked<'_, T> {
    pub fn score(&self) -> u32 {
        self.result.score
    }
}

/// Filter `records` to those whose pattern matches `url`, most specific first.
pub fn rank_by_url<'a, T: Patterned>(records: &'a [T], url: &str, domain: &str) -> Vec<&'a T> {
    rank_scored(records, url, domain)
        .into_iter()
        .map(|ranked| ranked.record)
        .collect()
}

/// Like [`rank_by_url`], but keeps each record's score and captured params.
pub fn rank_scored<'a, T: Patterned>(
    records: &'a [T],
    url: &str,
    domain: &str,
) -> Vec<Ranked<'a, T>> {
    let mut ranked: Vec<Ranked<'a, T>> = records
        .iter()
        .filter_map(|record| {
            let result = match_pattern(record.url_pattern(), url, domain);
            result.matched.then_some(Ranked { record, result })
        })
        .collect();

    // Stable sort: ties keep input order
    ranked.sort_by_key(|r| std::cmp::Reverse(r.result.score));

    tracing::debug!(
        url = %url,
        domain = %domain,
        candidates = records.len(),
        matched = ranked.len(),
        "ranked patterns by specificity"
    );

    ranked
}
