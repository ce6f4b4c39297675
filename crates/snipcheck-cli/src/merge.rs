//! Merging of a remote analyzer's issues into a local report
//!
//! Local issues always come first. A later issue is dropped when an earlier one
//! has the same rule and the same message prefix. Locations are not part of the
//! key, because remote analyzers often report them differently.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use snipcheck_core::Issue;

/// Characters of the message that take part in the merge key.
pub const MESSAGE_KEY_CHARS: usize = 200;

#[derive(Deserialize)]
#[serde(untagged)]
enum RemotePayload {
    Report { issues: Vec<Issue> },
    Results { results: Vec<Issue> },
    Bare(Vec<Issue>),
}

pub fn load_remote(path: &Path) -> Result<Vec<Issue>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read remote issues from '{}'", path.display()))?;
    parse_remote(&content)
        .with_context(|| format!("Invalid remote issues in '{}'", path.display()))
}

/// Accepts `{ "issues": [...] }`, `{ "results": [...] }` or a bare issue array.
pub fn parse_remote(content: &str) -> Result<Vec<Issue>> {
    let payload: RemotePayload = serde_json::from_str(content)
        .context("expected {\"issues\": [...]}, {\"results\": [...]} or an array of issues")?;

    Ok(match payload {
        RemotePayload::Report { issues }
        | RemotePayload::Results { results: issues }
        | RemotePayload::Bare(issues) => issues,
    })
}

pub fn merge(local: Vec<Issue>, remote: Vec<Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    let merged: Vec<Issue> = local
        .into_iter()
        .chain(remote)
        .filter(|issue| seen.insert(merge_key(issue)))
        .collect();

    tracing::debug!(issues = merged.len(), "merged remote issues");
    merged
}

fn merge_key(issue: &Issue) -> (String, String) {
    (
        issue.rule.clone(),
        issue.message.chars().take(MESSAGE_KEY_CHARS).collect(),
    )
}
