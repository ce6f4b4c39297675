//! off-by-one-for rule: `for` loops bounded by `i <= arr.length`.

use crate::declare_rule;
use crate::issue::Issue;
use crate::rules::{Rule, RuleError, RuleMetadata};
use crate::syntax::{Field, NodeKind, SyntaxNode};
use crate::visitor::VisitorContext;

declare_rule!(
    OffByOneFor,
    name = "off-by-one-for",
    description = "Loop condition compares an index with '<=' against a length",
    category = Correctness,
    severity = Warn,
    examples = "// Bad\nfor (let i = 0; i <= arr.length; i++) {}\n\n// Good\nfor (let i = 0; i < arr.length; i++) {}"
);

impl Rule for OffByOneFor {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, node: &SyntaxNode, ctx: &VisitorContext) -> Result<Option<Issue>, RuleError> {
        if node.kind != NodeKind::For {
            return Ok(None);
        }
        let Some(test) = ctx.child_with_field(node, Field::Test) else {
            return Ok(None);
        };
        if test.kind != NodeKind::Binary || test.text() != Some("<=") {
            return Ok(None);
        }
        let Some(bound) = ctx.child_with_field(test, Field::Right) else {
            return Ok(None);
        };

        if !is_length_access(bound, ctx) && !is_length_minus_one(bound, ctx) {
            return Ok(None);
        }

        Ok(Some(
            Issue::from_rule(
                &self.metadata,
                "Loop uses '<=' with .length which may be off-by-one when iterating by index.",
            )
            .at(ctx.location(test))
            .with_suggestion("Use '<' with array.length or adjust start/end appropriately"),
        ))
    }
}

/// `x.length` or `x["length"]`.
fn is_length_access(node: &SyntaxNode, ctx: &VisitorContext) -> bool {
    if node.kind != NodeKind::Member {
        return false;
    }
    let Some(property) = ctx.child_with_field(node, Field::Property) else {
        return false;
    };

    let expected = if node.is_computed() {
        NodeKind::StringLiteral
    } else {
        NodeKind::Identifier
    };
    property.kind == expected && property.text() == Some("length")
}

/// `x.length - 1`. Still reported even though it is a correct bound.
fn is_length_minus_one(node: &SyntaxNode, ctx: &VisitorContext) -> bool {
    if node.kind != NodeKind::Binary || node.text() != Some("-") {
        return false;
    }
    let left = ctx.child_with_field(node, Field::Left);
    let right = ctx.child_with_field(node, Field::Right);

    left.is_some_and(|left| is_length_access(left, ctx))
        && right.is_some_and(|right| {
            right.kind == NodeKind::NumberLiteral
                && right.text().and_then(|raw| raw.parse::<f64>().ok()) == Some(1.0)
        })
}
