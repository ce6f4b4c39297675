//! SyntaxVisitor trait for uniform tree traversal.

use std::ops::ControlFlow;

use crate::syntax::SyntaxNode;

use super::context::VisitorContext;

/// Enter/leave hooks driven by [`walk_tree`](super::walk_tree).
///
/// Returning `ControlFlow::Break` from [`enter`](Self::enter) stops the whole
/// walk; no further hooks are called.
pub trait SyntaxVisitor {
    fn enter(&mut self, _node: &SyntaxNode, _ctx: &VisitorContext) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn leave(&mut self, _node: &SyntaxNode, _ctx: &VisitorContext) {}
}
