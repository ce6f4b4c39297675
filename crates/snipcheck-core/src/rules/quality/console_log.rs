//! console-log rule: debug-output calls such as `console.log(...)`.
//!
//! The object and method names are configurable; by default only
//! `console.log` is reported. Computed accesses (`console["log"]`) are not.

use crate::issue::Issue;
use crate::rules::{Rule, RuleCategory, RuleError, RuleMetadata, Severity};
use crate::syntax::{Field, NodeKind, SyntaxNode};
use crate::visitor::VisitorContext;

pub const DEFAULT_OBJECTS: &[&str] = &["console"];
pub const DEFAULT_METHODS: &[&str] = &["log"];

pub struct ConsoleLog {
    metadata: RuleMetadata,
    objects: Vec<String>,
    methods: Vec<String>,
}

impl ConsoleLog {
    pub const METADATA: RuleMetadata = RuleMetadata {
        name: "console-log",
        description: "Debug output left in the code",
        category: RuleCategory::Style,
        severity: Severity::Info,
        examples: Some("// Bad\nconsole.log(user);\n\n// Good\nlogger.debug(user);"),
    };

    pub fn new() -> Self {
        Self::with_names(
            DEFAULT_OBJECTS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_METHODS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_names(objects: Vec<String>, methods: Vec<String>) -> Self {
        Self {
            metadata: Self::METADATA,
            objects,
            methods,
        }
    }

    /// `(object, method)` of a matching call.
    fn debug_call<'a>(
        &self,
        call: &SyntaxNode,
        ctx: &VisitorContext<'a>,
    ) -> Option<(&'a str, &'a str)> {
        let callee = ctx.child_with_field(call, Field::Callee)?;
        if callee.kind != NodeKind::Member || callee.is_computed() {
            return None;
        }

        let object = ctx.child_with_field(callee, Field::Object)?;
        let method = ctx.child_with_field(callee, Field::Property)?;
        if object.kind != NodeKind::Identifier || method.kind != NodeKind::Identifier {
            return None;
        }

        let object = object.text()?;
        let method = method.text()?;
        let known_object = self.objects.iter().any(|name| name == object);
        let known_method = self.methods.iter().any(|name| name == method);
        (known_object && known_method).then_some((object, method))
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ConsoleLog {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, node: &SyntaxNode, ctx: &VisitorContext) -> Result<Option<Issue>, RuleError> {
        if node.kind != NodeKind::Call {
            return Ok(None);
        }

        Ok(self.debug_call(node, ctx).map(|(object, method)| {
            Issue::from_rule(
                &self.metadata,
                format!("{object}.{method} found. Remove or replace with logger."),
            )
            .at(ctx.location(node))
            .with_suggestion("Use a logger or remove debug prints")
        }))
    }
}
