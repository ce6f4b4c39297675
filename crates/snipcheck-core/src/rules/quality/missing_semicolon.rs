//! missing-semicolon rule: a line-based heuristic over expression statements.
//!
//! Only the last line of the statement is inspected. Statements followed by a
//! trailing comment or sharing a line with another statement can be reported
//! or missed; the rule is informational.

use crate::declare_rule;
use crate::issue::Issue;
use crate::rules::{Rule, RuleError, RuleMetadata};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::visitor::VisitorContext;

const TERMINATORS: &[char] = &[';', '{', '}', ','];

declare_rule!(
    MissingSemicolon,
    name = "missing-semicolon",
    description = "Expression statement whose line does not end with a terminator",
    category = Style,
    severity = Info,
    examples = "// Bad\nconst total = sum(a, b)\nrender(total)\n\n// Good\nrender(total);"
);

impl Rule for MissingSemicolon {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, node: &SyntaxNode, ctx: &VisitorContext) -> Result<Option<Issue>, RuleError> {
        if node.kind != NodeKind::ExpressionStatement {
            return Ok(None);
        }

        let line = node.end.line;
        let text = ctx
            .line_text(line)
            .ok_or(RuleError::LineOutOfRange { line })?
            .trim();

        if text.is_empty() || text.ends_with(TERMINATORS) {
            return Ok(None);
        }

        Ok(Some(
            Issue::from_rule(&self.metadata, format!("Possible missing semicolon at line {line}"))
                .at(ctx.location(node))
                .with_suggestion("Add a semicolon if required by style"),
        ))
    }
}
