//! missing-return rule: functions that return a value on some paths but whose
//! body does not end with a `return`.
//!
//! This looks at the shape of the body only. A function ending in an
//! exhaustive `if`/`else` or a `throw` is still reported. Value returns are
//! searched in the whole function subtree, callbacks included.

use std::ops::ControlFlow;

use crate::declare_rule;
use crate::issue::Issue;
use crate::syntax::{NodeFlags, NodeId, NodeKind, SyntaxNode};
use crate::visitor::{SyntaxVisitor, VisitorContext, WalkError, walk_subtree};

/// A function node with a block body, collected during the main traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionRecord {
    pub node: NodeId,
    pub body: NodeId,
}

declare_rule!(
    MissingReturn,
    name = "missing-return",
    description = "Function returns a value on some paths but not at its end",
    category = Correctness,
    severity = Warn,
    examples = "// Bad\nfunction f(x) { if (x) { return 1; } }\n\n// Good\nfunction f(x) { if (x) { return 1; } return 0; }"
);

impl MissingReturn {
    pub fn check_function(
        &self,
        record: FunctionRecord,
        ctx: &VisitorContext,
        max_depth: usize,
    ) -> Result<Option<Issue>, WalkError> {
        let body = ctx.node(record.body);
        let Some(last) = body.children.last().map(|&id| ctx.node(id)) else {
            return Ok(None);
        };

        let mut finder = ValueReturnFinder { found: false };
        walk_subtree(record.node, &mut finder, ctx, max_depth)?;

        if !finder.found || last.kind == NodeKind::Return {
            return Ok(None);
        }

        let function = ctx.node(record.node);
        Ok(Some(
            Issue::from_rule(
                &self.metadata,
                "Function returns a value on some paths but does not return at end of function.",
            )
            .at(ctx.location(function))
            .with_suggestion("Ensure function returns a value on all code paths"),
        ))
    }
}

struct ValueReturnFinder {
    found: bool,
}

impl SyntaxVisitor for ValueReturnFinder {
    fn enter(&mut self, node: &SyntaxNode, _ctx: &VisitorContext) -> ControlFlow<()> {
        if node.kind == NodeKind::Return && node.flags.contains(NodeFlags::HAS_ARGUMENT) {
            self.found = true;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Backend, parse};
    use crate::rules::Severity;
    use crate::syntax::{Field, Location};
    use crate::visitor::DEFAULT_MAX_DEPTH;

    fn run_rule(code: &str, backend: Backend) -> Vec<Issue> {
        let tree = parse(code, backend).unwrap();
        let ctx = VisitorContext::new(&tree);
        let rule = MissingReturn::new();
        tree.descendants(tree.root())
            .into_iter()
            .filter(|node| node.kind.is_function())
            .filter_map(|node| {
                let body = ctx.child_with_field(node, Field::Body)?;
                (body.kind == NodeKind::Block).then_some(FunctionRecord {
                    node: node.id,
                    body: body.id,
                })
            })
            .filter_map(|record| {
                rule.check_function(record, &ctx, DEFAULT_MAX_DEPTH)
                    .unwrap()
            })
            .collect()
    }

    fn run_missing_return(code: &str) -> Vec<Issue> {
        run_rule(code, Backend::Swc)
    }

    #[test]
    fn detects_guarded_return_without_trailing_return() {
        let issues = run_missing_return("function f(x) {\n  if (x) { return 1; }\n}");

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "missing-return");
        assert_eq!(issues[0].severity, Severity::Warn);
        assert_eq!(
            issues[0].message,
            "Function returns a value on some paths but does not return at end of function."
        );
        assert_eq!(issues[0].location, Some(Location::new(1, 1)));
    }

    #[test]
    fn trailing_return_is_fine() {
        assert!(
            run_missing_return("function f(x) { if (x) { return 1; } return 0; }").is_empty()
        );
        assert!(run_missing_return("function f(x) { if (x) { return 1; } return; }").is_empty());
    }

    #[test]
    fn bare_returns_do_not_count() {
        assert!(run_missing_return("function f(x) { if (x) { return; } go(); }").is_empty());
    }

    #[test]
    fn empty_body_is_skipped() {
        assert!(run_missing_return("function f() {}").is_empty());
    }

    #[test]
    fn value_return_inside_callback_counts_for_the_outer_function() {
        let issues = run_missing_return(
            "function outer(items) {\n  items.map((x) => { return x * 2; });\n  done();\n}",
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, Some(Location::new(1, 1)));
    }

    #[test]
    fn value_return_inside_callback_with_trailing_return_is_fine() {
        let issues = run_missing_return(
            "function outer(items) {\n  items.map((x) => { return x * 2; });\n  return;\n}",
        );

        assert!(issues.is_empty());
    }

    #[test]
    fn nested_function_is_checked_on_its_own() {
        let issues = run_missing_return(
            "function outer() {\n  function inner(x) { if (x) { return 1; } }\n  return inner;\n}",
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, Some(Location::new(2, 3)));
    }

    #[test]
    fn methods_and_arrows_are_checked() {
        assert_eq!(
            run_missing_return("class A { m(x) { if (x) return 1; x++; } }").len(),
            1
        );
        assert_eq!(
            run_missing_return("const g = (x) => { while (x) { return x; } };").len(),
            1
        );
        assert!(run_missing_return("const h = (x) => x;").is_empty());
    }

    #[test]
    fn all_backends_agree() {
        let code = "function f(x) {\n  if (x) { return 1; }\n}\nfunction g(x) { return x; }\n";
        for backend in Backend::ALL {
            let locations: Vec<_> = run_rule(code, backend)
                .into_iter()
                .map(|issue| issue.location)
                .collect();
            assert_eq!(locations, vec![Some(Location::new(1, 1))], "{backend}");
        }
    }
}
