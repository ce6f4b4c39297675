//! Visitor context providing tree and source access during traversal.

use crate::syntax::{Field, Location, NodeId, SyntaxNode, SyntaxTree};

pub struct VisitorContext<'a> {
    tree: &'a SyntaxTree<'a>,
}

impl<'a> VisitorContext<'a> {
    pub fn new(tree: &'a SyntaxTree<'a>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &'a SyntaxTree<'a> {
        self.tree
    }

    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    pub fn node(&self, id: NodeId) -> &'a SyntaxNode {
        self.tree.get(id)
    }

    pub fn parent(&self, node: &SyntaxNode) -> Option<&'a SyntaxNode> {
        node.parent.map(|id| self.tree.get(id))
    }

    pub fn children(&self, node: &'a SyntaxNode) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.tree.children(node)
    }

    pub fn child_with_field(&self, node: &SyntaxNode, field: Field) -> Option<&'a SyntaxNode> {
        self.tree.child_by_field(node, field)
    }

    pub fn location(&self, node: &SyntaxNode) -> Location {
        node.start
    }

    pub fn source_text(&self, node: &SyntaxNode) -> Option<&'a str> {
        self.tree.slice(node)
    }

    /// Text of a 1-based line, without its terminator.
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        self.tree.line(line)
    }
}
