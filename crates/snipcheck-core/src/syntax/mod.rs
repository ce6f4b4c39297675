//! Normalized syntax tree shared by every parser back end.
//!
//! Back ends lower their native trees into this shape through [`TreeBuilder`].
//! Only the constructs the analysis passes look at get their own node; all
//! other syntax is transparent and its modeled descendants hang off the
//! nearest modeled ancestor.

mod builder;
mod line_index;

pub use builder::TreeBuilder;
pub use line_index::{LineIndex, Location};

use bitflags::bitflags;
use id_arena::{Arena, Id};

pub type NodeId = Id<SyntaxNode>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    Method,
    ClassDeclaration,
    ClassExpression,
    Block,
    CatchClause,
    VariableDeclaration,
    VariableDeclarator,
    Identifier,
    Call,
    Member,
    Binary,
    NumberLiteral,
    StringLiteral,
    Property,
    Import,
    ImportSpecifier,
    Export,
    ExpressionStatement,
    Return,
    If,
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
    Switch,
    Throw,
    Try,
    Break,
    Continue,
    Labeled,
    Empty,
    Debugger,
    With,
    TypeDeclaration,
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::FunctionExpression => "FunctionExpression",
            NodeKind::ArrowFunction => "ArrowFunctionExpression",
            NodeKind::Method => "MethodDefinition",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::ClassExpression => "ClassExpression",
            NodeKind::Block => "BlockStatement",
            NodeKind::CatchClause => "CatchClause",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::Identifier => "Identifier",
            NodeKind::Call => "CallExpression",
            NodeKind::Member => "MemberExpression",
            NodeKind::Binary => "BinaryExpression",
            NodeKind::NumberLiteral => "NumericLiteral",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::Property => "Property",
            NodeKind::Import => "ImportDeclaration",
            NodeKind::ImportSpecifier => "ImportSpecifier",
            NodeKind::Export => "ExportDeclaration",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::Return => "ReturnStatement",
            NodeKind::If => "IfStatement",
            NodeKind::For => "ForStatement",
            NodeKind::ForIn => "ForInStatement",
            NodeKind::ForOf => "ForOfStatement",
            NodeKind::While => "WhileStatement",
            NodeKind::DoWhile => "DoWhileStatement",
            NodeKind::Switch => "SwitchStatement",
            NodeKind::Throw => "ThrowStatement",
            NodeKind::Try => "TryStatement",
            NodeKind::Break => "BreakStatement",
            NodeKind::Continue => "ContinueStatement",
            NodeKind::Labeled => "LabeledStatement",
            NodeKind::Empty => "EmptyStatement",
            NodeKind::Debugger => "DebuggerStatement",
            NodeKind::With => "WithStatement",
            NodeKind::TypeDeclaration => "TypeDeclaration",
            NodeKind::Unknown => "Unknown",
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunction
                | NodeKind::Method
        )
    }

    pub fn opens_scope(&self) -> bool {
        self.is_function()
            || matches!(
                self,
                NodeKind::Program | NodeKind::Block | NodeKind::CatchClause
            )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The slot a node occupies in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Name of a declarator, function or class.
    Id,
    /// Key of an object property or class member.
    Key,
    /// Property of a member access.
    Property,
    Object,
    Callee,
    Left,
    Right,
    Test,
    Init,
    Update,
    Body,
    /// Simple parameter of a function.
    Param,
    /// Identifier bound by a destructuring pattern, catch clause or loop head.
    Binding,
    /// Local name introduced by an import.
    Local,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// `obj[expr]`, `{ [expr]: value }` and computed class members.
        const COMPUTED = 1 << 0;
        /// A `return` that carries a value.
        const HAS_ARGUMENT = 1 << 1;
    }
}

/// Half-open byte range into the analyzed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug)]
pub struct SyntaxNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub field: Option<Field>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub range: TextRange,
    pub start: Location,
    pub end: Location,
    /// Identifier name, literal source text or binary operator.
    pub text: Option<String>,
    pub flags: NodeFlags,
}

impl SyntaxNode {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_computed(&self) -> bool {
        self.flags.contains(NodeFlags::COMPUTED)
    }
}

pub struct SyntaxTree<'src> {
    source: &'src str,
    lines: LineIndex,
    arena: Arena<SyntaxNode>,
    root: NodeId,
}

impl std::fmt::Debug for SyntaxTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("source_len", &self.source.len())
            .field("node_count", &self.arena.len())
            .finish()
    }
}

impl<'src> SyntaxTree<'src> {
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.arena[self.root]
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &SyntaxNode {
        &self.arena[id]
    }

    pub fn parent(&self, node: &SyntaxNode) -> Option<&SyntaxNode> {
        node.parent.map(|id| &self.arena[id])
    }

    pub fn children<'t>(&'t self, node: &'t SyntaxNode) -> impl Iterator<Item = &'t SyntaxNode> {
        node.children.iter().map(|&id| &self.arena[id])
    }

    /// First child in `field`. The result borrows the tree only, not `node`.
    pub fn child_by_field(&self, node: &SyntaxNode, field: Field) -> Option<&SyntaxNode> {
        node.children
            .iter()
            .map(|&id| &self.arena[id])
            .find(|child| child.field == Some(field))
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line(&self, line_number: usize) -> Option<&'src str> {
        self.lines.line(self.source, line_number)
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Original source covered by a node, `None` if the range is not valid UTF-8 boundaries.
    pub fn slice(&self, node: &SyntaxNode) -> Option<&'src str> {
        self.source.get(node.range.start..node.range.end)
    }

    /// Nodes in depth-first pre-order.
    pub fn descendants(&self, node: &SyntaxNode) -> Vec<&SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![node.id];
        while let Some(id) = stack.pop() {
            let current = &self.arena[id];
            out.push(current);
            stack.extend(current.children.iter().rev().copied());
        }
        out
    }
}
