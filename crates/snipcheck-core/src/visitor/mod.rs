//! Visitor pattern for syntax tree traversal.
//!
//! Provides a uniform way to traverse the normalized tree with context
//! information. The walk is iterative and bounded by a nesting limit, so
//! adversarial input cannot exhaust the stack.

mod context;
mod traits;

pub use context::VisitorContext;
pub use traits::SyntaxVisitor;

use std::ops::ControlFlow;

use crate::syntax::NodeId;

pub const DEFAULT_MAX_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    #[error("syntax tree nesting exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

enum Step {
    Enter(NodeId, usize),
    Leave(NodeId),
}

/// Depth-first walk of the whole tree, calling `enter` before and `leave`
/// after each node's children.
pub fn walk_tree<V: SyntaxVisitor>(
    visitor: &mut V,
    ctx: &VisitorContext,
    max_depth: usize,
) -> Result<(), WalkError> {
    walk_subtree(ctx.tree().root_id(), visitor, ctx, max_depth)
}

/// Walks the subtree rooted at `start`. Depth is counted from `start`.
pub fn walk_subtree<V: SyntaxVisitor>(
    start: NodeId,
    visitor: &mut V,
    ctx: &VisitorContext,
    max_depth: usize,
) -> Result<(), WalkError> {
    let mut stack = vec![Step::Enter(start, 0)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id, depth) => {
                if depth > max_depth {
                    return Err(WalkError::DepthExceeded { limit: max_depth });
                }

                let node = ctx.node(id);
                if let ControlFlow::Break(()) = visitor.enter(node, ctx) {
                    return Ok(());
                }

                stack.push(Step::Leave(id));
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|&child| Step::Enter(child, depth + 1)),
                );
            }
            Step::Leave(id) => visitor.leave(ctx.node(id), ctx),
        }
    }

    Ok(())
}
