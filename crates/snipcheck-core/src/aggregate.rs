//! Issue aggregation across analysis passes.

use std::collections::HashSet;

use crate::issue::Issue;

/// Drops issues whose `(rule, message, location)` was already seen. The
/// first occurrence wins and order is preserved.
pub fn dedupe(issues: impl IntoIterator<Item = Issue>) -> Vec<Issue> {
    let mut seen = HashSet::new();
    issues
        .into_iter()
        .filter(|issue| seen.insert(issue.key()))
        .collect()
}
