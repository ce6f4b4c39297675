//! Identifier classification: declaration sites versus uses.

use crate::syntax::{Field, NodeKind, SyntaxNode};
use crate::visitor::VisitorContext;

/// Whether an identifier introduces or labels a name instead of reading one.
///
/// Declaration sites are declarator targets, function and class names, import
/// bindings, parameters, destructuring bindings, non-computed object or class
/// member keys and non-computed member-access properties.
pub fn is_declaration_site(node: &SyntaxNode, parent: Option<&SyntaxNode>) -> bool {
    match node.field {
        Some(Field::Id | Field::Local | Field::Param | Field::Binding) => true,
        Some(Field::Key) => parent.is_none_or(|parent| !parent.is_computed()),
        Some(Field::Property) => {
            parent.is_some_and(|parent| parent.kind == NodeKind::Member && !parent.is_computed())
        }
        _ => false,
    }
}

/// Name declared by a declarator or function declaration, unless the
/// declaration is exported. Class names are never declared.
pub fn declared_name<'a>(node: &SyntaxNode, ctx: &VisitorContext<'a>) -> Option<&'a str> {
    let exported = match node.kind {
        NodeKind::VariableDeclarator => ctx
            .parent(node)
            .and_then(|declaration| ctx.parent(declaration))
            .is_some_and(|owner| owner.kind == NodeKind::Export),
        NodeKind::FunctionDeclaration => {
            ctx.parent(node).is_some_and(|owner| owner.kind == NodeKind::Export)
        }
        _ => return None,
    };
    if exported {
        return None;
    }

    let id = ctx.child_with_field(node, Field::Id)?;
    if id.kind != NodeKind::Identifier {
        return None;
    }
    id.text()
}

/// Names declared by the direct child statements of a program or block.
pub fn hoisted_names<'a>(scope_node: &'a SyntaxNode, ctx: &VisitorContext<'a>) -> Vec<&'a str> {
    let mut names = Vec::new();
    for statement in ctx.children(scope_node) {
        match statement.kind {
            NodeKind::FunctionDeclaration => names.extend(declared_name(statement, ctx)),
            NodeKind::VariableDeclaration => {
                for declarator in ctx.children(statement) {
                    if declarator.kind == NodeKind::VariableDeclarator {
                        names.extend(declared_name(declarator, ctx));
                    }
                }
            }
            _ => {}
        }
    }
    names
}

/// Simple parameter names of a function node, in order.
pub fn parameter_names<'a>(function: &'a SyntaxNode, ctx: &VisitorContext<'a>) -> Vec<&'a str> {
    ctx.children(function)
        .filter(|child| child.field == Some(Field::Param))
        .filter_map(|child| child.text())
        .collect()
}
