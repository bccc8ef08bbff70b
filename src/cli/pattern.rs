//! `match` and `rank` commands.

use serde_json::json;

use super::CommandOutput;
use crate::pattern::{match_pattern, rank_scored};

pub(super) fn cmd_match(pattern: &str, url: &str, domain: &str) -> anyhow::Result<CommandOutput> {
    let result = match_pattern(pattern, url, domain);
    Ok(CommandOutput::accepted(serde_json::to_value(result)?))
}

pub(super) fn cmd_rank(url: &str, domain: &str, patterns: &[String]) -> anyhow::Result<CommandOutput> {
    let ranked: Vec<_> = rank_scored(patterns, url, domain)
        .into_iter()
        .map(|r| {
            json!({
                "pattern": r.record,
                "score": r.result.score,
                "params": r.result.params,
            })
        })
        .collect();
    Ok(CommandOutput::accepted(json!({ "url": url, "ranked": ranked })))
}
