use id_arena::Arena;

use super::{Field, LineIndex, NodeFlags, NodeId, NodeKind, SyntaxNode, SyntaxTree, TextRange};

/// Incrementally assembles a [`SyntaxTree`] in document order.
///
/// Back ends call [`open`](Self::open) / [`close`](Self::close) around
/// container nodes and [`leaf`](Self::leaf) for nodes without children.
/// When a native construct is transparent, a back end can announce the slot
/// its first modeled descendant should occupy with
/// [`expect_field`](Self::expect_field).
pub struct TreeBuilder<'src> {
    source: &'src str,
    lines: LineIndex,
    arena: Arena<SyntaxNode>,
    stack: Vec<NodeId>,
    pending: Option<(Option<NodeId>, Field)>,
    root: Option<NodeId>,
}

impl<'src> TreeBuilder<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            arena: Arena::new(),
            stack: Vec::new(),
            pending: None,
            root: None,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Innermost open node.
    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn open(&mut self, kind: NodeKind, field: Option<Field>, start: usize, end: usize) -> NodeId {
        let id = self.alloc(kind, field, start, end, None);
        self.stack.push(id);
        id
    }

    pub fn leaf(
        &mut self,
        kind: NodeKind,
        field: Option<Field>,
        start: usize,
        end: usize,
        text: Option<String>,
    ) -> NodeId {
        self.alloc(kind, field, start, end, text)
    }

    pub fn close(&mut self) -> Option<NodeId> {
        let closed = self.stack.pop();
        if matches!(self.pending, Some((owner, _)) if owner.is_some() && owner == closed) {
            self.pending = None;
        }
        closed
    }

    /// The next node created directly under the current node takes `field`
    /// unless it is given an explicit one.
    pub fn expect_field(&mut self, field: Field) {
        self.pending = Some((self.current(), field));
    }

    pub fn clear_field(&mut self) {
        self.pending = None;
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.arena[id].text = Some(text.into());
    }

    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.arena[id].flags.insert(flags);
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.arena[id]
    }

    /// Completes the tree. Nodes left open are closed; an empty build yields
    /// a bare program spanning the source.
    pub fn finish(mut self) -> SyntaxTree<'src> {
        self.stack.clear();
        self.pending = None;

        let root = match self.root {
            Some(root) => root,
            None => {
                let len = self.source.len();
                self.alloc(NodeKind::Program, None, 0, len, None)
            }
        };

        SyntaxTree {
            source: self.source,
            lines: self.lines,
            arena: self.arena,
            root,
        }
    }

    fn alloc(
        &mut self,
        kind: NodeKind,
        field: Option<Field>,
        start: usize,
        end: usize,
        text: Option<String>,
    ) -> NodeId {
        let parent = self.current();
        let field = match self.pending {
            Some((owner, pending)) if owner == parent => {
                self.pending = None;
                field.or(Some(pending))
            }
            _ => field,
        };

        let range = TextRange::new(start.min(self.source.len()), end.min(self.source.len()));
        let start_location = self.lines.location(self.source, range.start);
        let end_location = self.lines.location(self.source, range.end);

        let id = self.arena.alloc_with_id(|id| SyntaxNode {
            id,
            kind,
            field,
            parent,
            children: Vec::new(),
            range,
            start: start_location,
            end: end_location,
            text,
            flags: NodeFlags::empty(),
        });

        match parent {
            Some(parent) => self.arena[parent].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => {}
        }

        id
    }
}
