//! duplicate-block rule: repeated runs of three consecutive statements.
//!
//! Every block with at least [`WINDOW`] statements contributes one fingerprint
//! per window position. Fingerprints are the statement kinds followed by the
//! whitespace-normalized statement text, so reindented copies still match.

use indexmap::IndexMap;

use crate::declare_rule;
use crate::issue::Issue;
use crate::rules::RuleError;
use crate::syntax::{NodeKind, SyntaxNode};
use crate::visitor::VisitorContext;

pub const WINDOW: usize = 3;
pub const DEFAULT_MAX_SOURCE_CHARS: usize = 200_000;
const MAX_STATEMENT_CHARS: usize = 200;

declare_rule!(
    DuplicateBlock,
    name = "duplicate-block",
    description = "The same three consecutive statements appear in several blocks",
    category = Style,
    severity = Warn,
    examples = "// Bad\nfunction a() { x(); y(); z(); }\nfunction b() { x(); y(); z(); }\n\n// Good\nfunction xyz() { x(); y(); z(); }"
);

impl DuplicateBlock {
    /// Issues for every fingerprint seen more than once, in first-seen
    /// order. Sources longer than `max_source_chars` are not inspected.
    pub fn find(
        &self,
        ctx: &VisitorContext,
        max_source_chars: usize,
    ) -> Result<Vec<Issue>, RuleError> {
        let source = ctx.source();
        if source.len() > max_source_chars && source.chars().count() > max_source_chars {
            tracing::debug!(
                chars = source.chars().count(),
                limit = max_source_chars,
                "source too large for duplicate detection"
            );
            return Ok(Vec::new());
        }

        let tree = ctx.tree();
        let mut counts: IndexMap<String, usize> = IndexMap::new();

        for block in tree.descendants(tree.root()) {
            if block.kind != NodeKind::Block || block.children.len() < WINDOW {
                continue;
            }
            let statements: Vec<&SyntaxNode> = ctx.children(block).collect();
            for window in statements.windows(WINDOW) {
                *counts.entry(fingerprint(window, ctx)?).or_default() += 1;
            }
        }

        Ok(counts
            .into_values()
            .filter(|&count| count > 1)
            .map(|count| {
                Issue::from_rule(
                    &self.metadata,
                    format!(
                        "Similar code block appears {count} times. Consider extracting a function."
                    ),
                )
                .with_suggestion("Extract repeated logic")
            })
            .collect())
    }
}

fn fingerprint(window: &[&SyntaxNode], ctx: &VisitorContext) -> Result<String, RuleError> {
    let kinds: Vec<&str> = window.iter().map(|statement| statement.kind.as_str()).collect();
    let texts = window
        .iter()
        .map(|statement| statement_text(statement, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("{}::{}", kinds.join("|"), texts.join("||")))
}

fn statement_text(statement: &SyntaxNode, ctx: &VisitorContext) -> Result<String, RuleError> {
    let raw = ctx
        .source_text(statement)
        .ok_or(RuleError::InvalidRange {
            start: statement.range.start,
            end: statement.range.end,
        })?;

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(collapsed.chars().take(MAX_STATEMENT_CHARS).collect())
}
