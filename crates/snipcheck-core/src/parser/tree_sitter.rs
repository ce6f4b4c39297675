//! Back ends built on tree-sitter grammars.
//!
//! The concrete syntax tree is lowered iteratively with a single cursor, so
//! deeply nested input cannot exhaust the stack. Named nodes are classified by
//! their own kind, their parent's kind and the grammar field they occupy.

use std::sync::OnceLock;

use tree_sitter::{Language, Node, Parser, Tree};

use super::{ParseBackend, ParseError, SyntaxError};
use crate::syntax::{Field, LineIndex, NodeFlags, NodeKind, SyntaxTree, TreeBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `tree-sitter-javascript`: module code, JSX, modern class syntax.
    JavaScript,
    /// The TSX grammar of `tree-sitter-typescript`.
    Tsx,
}

static JAVASCRIPT: OnceLock<Language> = OnceLock::new();
static TSX: OnceLock<Language> = OnceLock::new();

impl Dialect {
    fn language(self) -> &'static Language {
        match self {
            Dialect::JavaScript => {
                JAVASCRIPT.get_or_init(|| tree_sitter_javascript::LANGUAGE.into())
            }
            Dialect::Tsx => TSX.get_or_init(|| tree_sitter_typescript::LANGUAGE_TSX.into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeSitterBackend {
    dialect: Dialect,
}

impl TreeSitterBackend {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl ParseBackend for TreeSitterBackend {
    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::JavaScript => "tree-sitter",
            Dialect::Tsx => "tree-sitter-tsx",
        }
    }

    fn parse<'src>(&self, source: &'src str) -> Result<SyntaxTree<'src>, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(self.dialect.language())
            .map_err(|err| ParseError::Backend(err.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Backend(format!("{} produced no tree", self.name())))?;

        if let Some(error) = first_error(&tree, source) {
            return Err(ParseError::Syntax(error));
        }

        Ok(lower(&tree, source))
    }
}

/// First ERROR or MISSING node in document order.
fn first_error(tree: &Tree, source: &str) -> Option<SyntaxError> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(syntax_error(node, source));
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Some(syntax_error(root, source));
            }
        }
    }
}

fn syntax_error(node: Node<'_>, source: &str) -> SyntaxError {
    let location = LineIndex::new(source).location(source, node.start_byte());

    let message = if node.is_missing() {
        format!("Missing `{}`", node.kind())
    } else {
        let snippet = source
            .get(node.byte_range())
            .and_then(|text| text.trim().lines().next())
            .filter(|text| !text.is_empty());
        match snippet {
            Some(text) => format!("Unexpected `{}`", text.chars().take(40).collect::<String>()),
            None => "Unexpected end of input".to_string(),
        }
    };

    SyntaxError {
        message,
        line: location.line,
        column: location.column,
    }
}

struct Frame<'tree> {
    node: Node<'tree>,
    opened: usize,
    binding: bool,
    pending: bool,
}

enum Action {
    Skip,
    Leaf(NodeKind, Option<Field>),
    Open(NodeKind, Option<Field>),
    Transparent { field: Option<Field>, binding: bool },
    Computed,
    Declarator,
}

struct Lowering<'src, 'tree> {
    builder: TreeBuilder<'src>,
    source: &'src str,
    frames: Vec<Frame<'tree>>,
}

fn lower<'src>(tree: &Tree, source: &'src str) -> SyntaxTree<'src> {
    let root = tree.root_node();
    let mut lowering = Lowering {
        builder: TreeBuilder::new(source),
        source,
        frames: Vec::new(),
    };
    lowering
        .builder
        .open(NodeKind::Program, None, 0, source.len());
    lowering.frames.push(Frame {
        node: root,
        opened: 1,
        binding: false,
        pending: false,
    });

    let mut cursor = root.walk();
    if !cursor.goto_first_child() {
        return lowering.builder.finish();
    }

    loop {
        let node = cursor.node();
        let descend = lowering.enter(node, cursor.field_name());
        if descend {
            if cursor.goto_first_child() {
                continue;
            }
            lowering.leave();
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return lowering.builder.finish();
            }
            lowering.leave();
        }
    }
}

impl<'src, 'tree> Lowering<'src, 'tree> {
    /// Records `node` and reports whether its children should be visited.
    fn enter(&mut self, node: Node<'tree>, field_name: Option<&'static str>) -> bool {
        if !node.is_named() || node.is_extra() {
            return false;
        }
        let Some(frame) = self.frames.last() else {
            return false;
        };
        let parent = frame.node;
        let binding = frame.binding;

        match classify(node, parent, field_name, binding) {
            Action::Skip => false,
            Action::Leaf(kind, field) => {
                let text = self.text(node, kind);
                self.builder
                    .leaf(kind, field, node.start_byte(), node.end_byte(), text);
                false
            }
            Action::Open(kind, field) => {
                let id = self
                    .builder
                    .open(kind, field, node.start_byte(), node.end_byte());
                match node.kind() {
                    "binary_expression" => {
                        if let Some(operator) = node.child_by_field_name("operator") {
                            self.builder.set_text(id, operator.kind());
                        }
                    }
                    "subscript_expression" => self.builder.set_flags(id, NodeFlags::COMPUTED),
                    "return_statement" if has_named_child(node) => {
                        self.builder.set_flags(id, NodeFlags::HAS_ARGUMENT);
                    }
                    _ => {}
                }
                self.push(node, 1, false, false);
                true
            }
            Action::Transparent { field, binding } => {
                if let Some(field) = field {
                    self.builder.expect_field(field);
                }
                self.push(node, 0, binding, field.is_some());
                true
            }
            Action::Computed => {
                if let Some(owner) = self.builder.current() {
                    self.builder.set_flags(owner, NodeFlags::COMPUTED);
                }
                self.push(node, 0, false, false);
                true
            }
            Action::Declarator => {
                let start = parent
                    .child_by_field_name("kind")
                    .map_or(node.start_byte(), |kind| kind.start_byte());
                self.builder
                    .open(NodeKind::VariableDeclaration, None, start, node.end_byte());
                self.builder.open(
                    NodeKind::VariableDeclarator,
                    None,
                    node.start_byte(),
                    node.end_byte(),
                );
                if node.kind() == "identifier" {
                    let text = self.text(node, NodeKind::Identifier);
                    self.builder.leaf(
                        NodeKind::Identifier,
                        Some(Field::Id),
                        node.start_byte(),
                        node.end_byte(),
                        text,
                    );
                    self.builder.close();
                    self.builder.close();
                    false
                } else {
                    self.push(node, 2, true, false);
                    true
                }
            }
        }
    }

    fn leave(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        for _ in 0..frame.opened {
            self.builder.close();
        }
        if frame.pending {
            self.builder.clear_field();
        }
    }

    fn push(&mut self, node: Node<'tree>, opened: usize, binding: bool, pending: bool) {
        self.frames.push(Frame {
            node,
            opened,
            binding,
            pending,
        });
    }

    fn text(&self, node: Node<'_>, kind: NodeKind) -> Option<String> {
        let raw = self.source.get(node.byte_range())?;
        match kind {
            NodeKind::StringLiteral => {
                let mut chars = raw.chars();
                chars.next();
                chars.next_back();
                Some(chars.as_str().to_string())
            }
            _ => Some(raw.to_string()),
        }
    }
}

fn has_named_child(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).any(|child| !child.is_extra())
}

fn classify(node: Node<'_>, parent: Node<'_>, field: Option<&str>, binding: bool) -> Action {
    let kind = node.kind();
    let parent_kind = parent.kind();

    if is_skipped(kind) {
        return Action::Skip;
    }

    match (parent_kind, field) {
        ("as_expression" | "satisfies_expression", _) if node.prev_named_sibling().is_some() => {
            return Action::Skip;
        }
        ("for_statement", _) if kind == "empty_statement" => return Action::Skip,
        ("import_statement" | "export_statement", Some("source")) => return Action::Skip,
        (
            "function_signature" | "method_signature" | "abstract_method_signature",
            Some("parameters"),
        ) => return Action::Skip,
        ("for_in_statement", Some("left")) if parent.child_by_field_name("kind").is_some() => {
            return Action::Declarator;
        }
        _ => {}
    }

    let slot = slot(parent_kind, field);

    match kind {
        "identifier" | "undefined" => identifier(parent, field, slot, binding),
        "property_identifier" => match slot {
            Some(Field::Property | Field::Key) => Action::Leaf(NodeKind::Identifier, slot),
            _ => Action::Skip,
        },
        "type_identifier" if is_class(parent_kind) && field == Some("name") => {
            Action::Leaf(NodeKind::Identifier, Some(Field::Id))
        }
        "type_identifier" => Action::Skip,
        "shorthand_property_identifier" => Action::Leaf(NodeKind::Identifier, None),
        "shorthand_property_identifier_pattern" => {
            Action::Leaf(NodeKind::Identifier, binding.then_some(Field::Binding))
        }
        "number" => Action::Leaf(NodeKind::NumberLiteral, slot),
        "string" => Action::Leaf(NodeKind::StringLiteral, slot),
        "computed_property_name" => Action::Computed,
        "interface_declaration" | "type_alias_declaration" | "enum_declaration"
        | "ambient_declaration" | "module" | "internal_module" | "import_alias" => {
            Action::Leaf(NodeKind::TypeDeclaration, None)
        }
        "expression_statement" if parent_kind == "for_statement" => Action::Transparent {
            field: slot,
            binding: false,
        },
        _ => match node_kind(node) {
            Some(kind) => Action::Open(kind, slot),
            None if matches!(parent_kind, "program" | "statement_block") => {
                Action::Open(NodeKind::Unknown, None)
            }
            None => Action::Transparent {
                field: slot,
                binding: child_binding(parent_kind, field, binding),
            },
        },
    }
}

fn is_skipped(kind: &str) -> bool {
    matches!(
        kind,
        "comment"
            | "hash_bang_line"
            | "html_comment"
            | "regex"
            | "statement_identifier"
            | "private_property_identifier"
            | "meta_property"
            | "type_annotation"
            | "type_arguments"
            | "type_parameters"
            | "implements_clause"
            | "omitting_type_annotation"
            | "adding_type_annotation"
            | "opting_type_annotation"
            | "asserts_annotation"
            | "type_predicate_annotation"
            | "accessibility_modifier"
            | "override_modifier"
    )
}

fn identifier(parent: Node<'_>, field: Option<&str>, slot: Option<Field>, binding: bool) -> Action {
    let field = match (parent.kind(), field) {
        ("import_specifier", Some("name")) if parent.child_by_field_name("alias").is_some() => {
            return Action::Skip;
        }
        ("import_specifier" | "import_clause" | "namespace_import", _) => Some(Field::Local),
        ("formal_parameters", _) | ("arrow_function", Some("parameter")) => Some(Field::Param),
        ("required_parameter" | "optional_parameter", Some("pattern")) => {
            if is_simple_parameter(parent) {
                Some(Field::Param)
            } else {
                Some(Field::Binding)
            }
        }
        ("catch_clause", Some("parameter")) => Some(Field::Binding),
        _ => slot.or(binding.then_some(Field::Binding)),
    };

    Action::Leaf(NodeKind::Identifier, field)
}

/// A TypeScript parameter without a default value or a parameter property
/// modifier.
fn is_simple_parameter(parameter: Node<'_>) -> bool {
    if parameter.child_by_field_name("value").is_some() {
        return false;
    }
    let mut cursor = parameter.walk();
    parameter.children(&mut cursor).all(|child| {
        !matches!(
            child.kind(),
            "accessibility_modifier" | "override_modifier" | "readonly"
        )
    })
}

fn slot(parent_kind: &str, field: Option<&str>) -> Option<Field> {
    let field = field?;
    let slot = match (parent_kind, field) {
        ("variable_declarator", "name") => Field::Id,
        ("variable_declarator", "value") => Field::Init,
        ("method_definition" | "method_signature" | "abstract_method_signature", "name") => {
            Field::Key
        }
        ("pair", "key") | ("field_definition", "property") | ("public_field_definition", "name") => {
            Field::Key
        }
        (parent, "name") if is_function_like(parent) || is_class(parent) => Field::Id,
        ("member_expression" | "subscript_expression", "object") => Field::Object,
        ("member_expression", "property") | ("subscript_expression", "index") => Field::Property,
        ("call_expression", "function") => Field::Callee,
        ("binary_expression", "left") => Field::Left,
        ("binary_expression", "right") => Field::Right,
        ("for_statement", "initializer") => Field::Init,
        ("for_statement", "condition") => Field::Test,
        ("for_statement", "increment") => Field::Update,
        (parent, "body") if is_function_like(parent) || parent == "catch_clause" => Field::Body,
        _ => return None,
    };
    Some(slot)
}

fn child_binding(parent_kind: &str, field: Option<&str>, binding: bool) -> bool {
    match (parent_kind, field) {
        ("assignment_pattern" | "object_assignment_pattern", Some("right")) => false,
        ("required_parameter" | "optional_parameter", Some("value")) => false,
        ("formal_parameters", _)
        | ("arrow_function", Some("parameter"))
        | ("variable_declarator", Some("name"))
        | ("catch_clause", Some("parameter"))
        | ("required_parameter" | "optional_parameter", Some("pattern")) => true,
        _ => binding,
    }
}

fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
            | "function_signature"
            | "method_signature"
            | "abstract_method_signature"
    )
}

fn is_class(kind: &str) -> bool {
    matches!(kind, "class_declaration" | "abstract_class_declaration" | "class")
}

fn node_kind(node: Node<'_>) -> Option<NodeKind> {
    let kind = match node.kind() {
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            NodeKind::FunctionDeclaration
        }
        "function_expression" | "function" | "generator_function" => NodeKind::FunctionExpression,
        "arrow_function" => NodeKind::ArrowFunction,
        "method_definition" | "method_signature" | "abstract_method_signature" => NodeKind::Method,
        "class_declaration" | "abstract_class_declaration" => NodeKind::ClassDeclaration,
        "class" => NodeKind::ClassExpression,
        "statement_block" => NodeKind::Block,
        "catch_clause" => NodeKind::CatchClause,
        "lexical_declaration" | "variable_declaration" | "using_declaration" => {
            NodeKind::VariableDeclaration
        }
        "variable_declarator" => NodeKind::VariableDeclarator,
        "call_expression" => NodeKind::Call,
        "member_expression" | "subscript_expression" => NodeKind::Member,
        "binary_expression" => NodeKind::Binary,
        "pair" | "field_definition" | "public_field_definition" => NodeKind::Property,
        "import_statement" => NodeKind::Import,
        "import_specifier" | "namespace_import" => NodeKind::ImportSpecifier,
        "export_statement" => NodeKind::Export,
        "expression_statement" => NodeKind::ExpressionStatement,
        "return_statement" => NodeKind::Return,
        "if_statement" => NodeKind::If,
        "for_statement" => NodeKind::For,
        "for_in_statement" => {
            let is_of = node
                .child_by_field_name("operator")
                .is_some_and(|operator| operator.kind() == "of");
            if is_of {
                NodeKind::ForOf
            } else {
                NodeKind::ForIn
            }
        }
        "while_statement" => NodeKind::While,
        "do_statement" => NodeKind::DoWhile,
        "switch_statement" => NodeKind::Switch,
        "throw_statement" => NodeKind::Throw,
        "try_statement" => NodeKind::Try,
        "break_statement" => NodeKind::Break,
        "continue_statement" => NodeKind::Continue,
        "labeled_statement" => NodeKind::Labeled,
        "empty_statement" => NodeKind::Empty,
        "debugger_statement" => NodeKind::Debugger,
        "with_statement" => NodeKind::With,
        _ => return None,
    };
    Some(kind)
}
