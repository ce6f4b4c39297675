//! unused-variable rule: names declared in a scope and never read in it.
//!
//! Reported when the scope closes, at the node that opened the scope.

use crate::declare_rule;
use crate::issue::Issue;
use crate::semantic::Scope;
use crate::visitor::VisitorContext;

declare_rule!(
    UnusedVariable,
    name = "unused-variable",
    description = "Variable, parameter, function or class declared but never used",
    category = Correctness,
    severity = Info,
    examples = "// Bad\nfunction f() { const a = 1; return 2; }\n\n// Good\nfunction f() { const a = 1; return a; }"
);

impl UnusedVariable {
    pub fn report(&self, scope: &Scope, ctx: &VisitorContext) -> Vec<Issue> {
        let location = scope.owner.map(|owner| ctx.location(ctx.node(owner)));

        scope
            .unused()
            .map(|name| {
                let issue = Issue::from_rule(
                    &self.metadata,
                    format!("Variable \"{name}\" is declared but never used."),
                )
                .with_suggestion("Remove or use the variable");
                match location {
                    Some(location) => issue.at(location),
                    None => issue,
                }
            })
            .collect()
    }
}
