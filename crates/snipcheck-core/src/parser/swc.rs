//! Back end built on `swc_ecma_parser`.

use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, AssignPat, AssignPatProp, BinExpr, BindingIdent, BlockStmt, BlockStmtOrExpr,
    BreakStmt, CallExpr, Callee, CatchClause, Class, ClassDecl, ClassExpr, ClassMethod, ClassProp,
    ComputedPropName, Constructor, ContinueStmt, Decl, EsVersion, ExprStmt, FnDecl, FnExpr,
    ForStmt, Function, GetterProp, Ident, ImportDefaultSpecifier, ImportNamedSpecifier,
    ImportStarAsSpecifier, KeyValueProp, LabeledStmt, MemberExpr, MemberProp, MethodProp, Module,
    ModuleDecl, Number, ParamOrTsParamProp, Pat, PrivateMethod, PrivateProp, PropName,
    SetterProp, Stmt, Str, TsType, TsTypeAnn, TsTypeParamDecl, TsTypeParamInstantiation,
    VarDecl, VarDeclarator,
};
use swc_ecma_parser::{Syntax, TsSyntax, parse_file_as_module};
use swc_ecma_visit::{Visit, VisitWith};

use super::{ParseBackend, ParseError, SyntaxError};
use crate::syntax::{Field, LineIndex, NodeFlags, NodeId, NodeKind, SyntaxTree, TreeBuilder};

/// Deepest bracket nesting handed to swc. Deeper input is refused up front.
const MAX_NESTING: usize = 1024;

/// Stack reserved for one parse. Sized for `MAX_NESTING` levels of the
/// recursive parser plus the lowering.
const PARSE_STACK_BYTES: usize = 256 * 1024 * 1024;

/// Parses snippets as TypeScript modules with JSX and decorators enabled, a
/// superset that accepts plain JavaScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcBackend;

impl SwcBackend {
    fn syntax() -> Syntax {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        })
    }
}

impl ParseBackend for SwcBackend {
    fn name(&self) -> &'static str {
        "swc"
    }

    fn parse<'src>(&self, source: &'src str) -> Result<SyntaxTree<'src>, ParseError> {
        let depth = bracket_depth(source);
        if depth > MAX_NESTING {
            tracing::debug!(depth, limit = MAX_NESTING, "snippet nests too deeply for swc");
            return Err(ParseError::Backend(format!(
                "nesting depth {depth} exceeds the swc limit of {MAX_NESTING}"
            )));
        }

        // swc parses and lowers recursively; run on a dedicated stack so the
        // caller's thread size does not matter.
        stacker::grow(PARSE_STACK_BYTES, || parse_module(source))
    }
}

fn parse_module(source: &str) -> Result<SyntaxTree<'_>, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let fm = source_map.new_source_file(
        FileName::Custom("snippet.tsx".into()).into(),
        source.to_string(),
    );
    let base = fm.start_pos.0;

    let mut recovered = Vec::new();
    let result = parse_file_as_module(
        &fm,
        SwcBackend::syntax(),
        EsVersion::latest(),
        None,
        &mut recovered,
    );

    for error in &recovered {
        let offset = error.span().lo.0.saturating_sub(base);
        tracing::debug!(offset, message = %error.kind().msg(), "swc recovered from parse error");
    }

    let module = result.map_err(|error| {
        let offset = error.span().lo.0.saturating_sub(base) as usize;
        let location = LineIndex::new(source).location(source, offset);
        ParseError::Syntax(SyntaxError {
            message: error.kind().msg().to_string(),
            line: location.line,
            column: location.column,
        })
    })?;

    let mut lowering = Lowering {
        builder: TreeBuilder::new(source),
        base,
        binding: false,
    };
    module.visit_with(&mut lowering);
    Ok(lowering.builder.finish())
}

/// Deepest bracket nesting in `source`. Brackets inside string literals,
/// template text and comments are ignored; regex literals are not recognized.
fn bracket_depth(source: &str) -> usize {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    deepest
}

/// Lowers the swc AST into the normalized tree.
///
/// `binding` is set while visiting declaration patterns so that plain
/// identifiers inside them are recorded as bindings instead of references.
struct Lowering<'src> {
    builder: TreeBuilder<'src>,
    base: u32,
    binding: bool,
}

impl Lowering<'_> {
    fn offsets(&self, span: Span) -> (usize, usize) {
        (
            span.lo.0.saturating_sub(self.base) as usize,
            span.hi.0.saturating_sub(self.base) as usize,
        )
    }

    fn open(&mut self, kind: NodeKind, field: Option<Field>, span: Span) -> NodeId {
        let (start, end) = self.offsets(span);
        self.builder.open(kind, field, start, end)
    }

    fn close(&mut self) {
        self.builder.close();
    }

    fn leaf(&mut self, kind: NodeKind, field: Option<Field>, span: Span, text: Option<String>) {
        let (start, end) = self.offsets(span);
        self.builder.leaf(kind, field, start, end, text);
    }

    fn ident(&mut self, ident: &Ident, field: Option<Field>) {
        self.leaf(
            NodeKind::Identifier,
            field,
            ident.span,
            Some(ident.sym.to_string()),
        );
    }

    fn raw(&self, span: Span) -> Option<&str> {
        let (start, end) = self.offsets(span);
        self.builder.source().get(start..end)
    }

    fn in_slot(&mut self, field: Field, f: impl FnOnce(&mut Self)) {
        self.builder.expect_field(field);
        f(self);
        self.builder.clear_field();
    }

    fn with_binding(&mut self, binding: bool, f: impl FnOnce(&mut Self)) {
        let previous = std::mem::replace(&mut self.binding, binding);
        f(self);
        self.binding = previous;
    }

    fn block(&mut self, block: &BlockStmt, field: Option<Field>) {
        self.open(NodeKind::Block, field, block.span);
        self.with_binding(false, |this| {
            for stmt in &block.stmts {
                stmt.visit_with(this);
            }
        });
        self.close();
    }

    fn param(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(binding) if &*binding.id.sym != "this" => {
                self.ident(&binding.id, Some(Field::Param));
            }
            Pat::Ident(_) => {}
            other => self.with_binding(true, |this| other.visit_with(this)),
        }
    }

    /// Parameters and body of a function. Signatures without a body
    /// contribute nothing.
    fn function_parts(&mut self, function: &Function) {
        let Some(body) = &function.body else {
            return;
        };

        self.with_binding(false, |this| {
            for param in &function.params {
                this.param(&param.pat);
            }
            this.block(body, Some(Field::Body));
        });
    }

    fn function(&mut self, kind: NodeKind, name: Option<&Ident>, function: &Function) {
        self.open(kind, None, function.span);
        if let Some(name) = name {
            self.ident(name, Some(Field::Id));
        }
        self.function_parts(function);
        self.close();
    }

    fn class(&mut self, kind: NodeKind, name: Option<&Ident>, class: &Class) {
        self.open(kind, None, class.span);
        if let Some(name) = name {
            self.ident(name, Some(Field::Id));
        }
        self.with_binding(false, |this| {
            for decorator in &class.decorators {
                decorator.visit_with(this);
            }
            if let Some(super_class) = &class.super_class {
                super_class.visit_with(this);
            }
            for member in &class.body {
                member.visit_with(this);
            }
        });
        self.close();
    }

    fn prop_name(&mut self, key: &PropName, owner: NodeId) {
        match key {
            PropName::Ident(name) => self.leaf(
                NodeKind::Identifier,
                Some(Field::Key),
                name.span,
                Some(name.sym.to_string()),
            ),
            PropName::Str(s) => {
                let text = self.raw(s.span).map(unquote);
                self.leaf(NodeKind::StringLiteral, Some(Field::Key), s.span, text);
            }
            PropName::Num(n) => {
                let text = self.raw(n.span).map(str::to_string);
                self.leaf(NodeKind::NumberLiteral, Some(Field::Key), n.span, text);
            }
            PropName::Computed(computed) => {
                self.builder.set_flags(owner, NodeFlags::COMPUTED);
                self.with_binding(false, |this| computed.expr.visit_with(this));
            }
            PropName::BigInt(_) => {}
        }
    }
}

fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

impl Visit for Lowering<'_> {
    fn visit_module(&mut self, module: &Module) {
        let len = self.builder.source().len();
        self.builder.open(NodeKind::Program, None, 0, len);
        module.visit_children_with(self);
        self.builder.close();
    }

    fn visit_module_decl(&mut self, decl: &ModuleDecl) {
        match decl {
            ModuleDecl::Import(import) => {
                self.open(NodeKind::Import, None, import.span);
                for specifier in &import.specifiers {
                    specifier.visit_with(self);
                }
                self.close();
            }
            ModuleDecl::TsImportEquals(import) => {
                self.leaf(NodeKind::Import, None, import.span, None);
            }
            ModuleDecl::ExportNamed(named) => {
                self.open(NodeKind::Export, None, named.span);
                for specifier in &named.specifiers {
                    specifier.visit_with(self);
                }
                self.close();
            }
            ModuleDecl::ExportAll(all) => self.leaf(NodeKind::Export, None, all.span, None),
            other => {
                self.open(NodeKind::Export, None, other.span());
                other.visit_children_with(self);
                self.close();
            }
        }
    }

    fn visit_import_named_specifier(&mut self, specifier: &ImportNamedSpecifier) {
        self.open(NodeKind::ImportSpecifier, None, specifier.span);
        self.ident(&specifier.local, Some(Field::Local));
        self.close();
    }

    fn visit_import_default_specifier(&mut self, specifier: &ImportDefaultSpecifier) {
        self.open(NodeKind::ImportSpecifier, None, specifier.span);
        self.ident(&specifier.local, Some(Field::Local));
        self.close();
    }

    fn visit_import_star_as_specifier(&mut self, specifier: &ImportStarAsSpecifier) {
        self.open(NodeKind::ImportSpecifier, None, specifier.span);
        self.ident(&specifier.local, Some(Field::Local));
        self.close();
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.block(block, None),
            Stmt::Expr(expr) => self.visit_expr_stmt(expr),
            Stmt::For(for_stmt) => self.visit_for_stmt(for_stmt),
            Stmt::Decl(decl) => self.visit_decl(decl),
            Stmt::Return(ret) => {
                let id = self.open(NodeKind::Return, None, ret.span);
                if ret.arg.is_some() {
                    self.builder.set_flags(id, NodeFlags::HAS_ARGUMENT);
                }
                ret.visit_children_with(self);
                self.close();
            }
            other => {
                self.open(statement_kind(other), None, other.span());
                other.visit_children_with(self);
                self.close();
            }
        }
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Fn(fn_decl) => self.visit_fn_decl(fn_decl),
            Decl::Class(class_decl) => self.visit_class_decl(class_decl),
            Decl::Var(var_decl) => self.visit_var_decl(var_decl),
            Decl::Using(using) => {
                self.open(NodeKind::VariableDeclaration, None, using.span);
                for declarator in &using.decls {
                    self.visit_var_declarator(declarator);
                }
                self.close();
            }
            other => self.leaf(NodeKind::TypeDeclaration, None, other.span(), None),
        }
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.function(NodeKind::FunctionDeclaration, Some(&decl.ident), &decl.function);
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        self.function(NodeKind::FunctionExpression, expr.ident.as_ref(), &expr.function);
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.open(NodeKind::ArrowFunction, None, arrow.span);
        self.with_binding(false, |this| {
            for param in &arrow.params {
                this.param(param);
            }
            match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(body) => this.block(body, Some(Field::Body)),
                BlockStmtOrExpr::Expr(expr) => this.in_slot(Field::Body, |this| expr.visit_with(this)),
            }
        });
        self.close();
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        self.class(NodeKind::ClassDeclaration, Some(&decl.ident), &decl.class);
    }

    fn visit_class_expr(&mut self, expr: &ClassExpr) {
        self.class(NodeKind::ClassExpression, expr.ident.as_ref(), &expr.class);
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        let id = self.open(NodeKind::Method, None, method.span);
        self.prop_name(&method.key, id);
        self.function_parts(&method.function);
        self.close();
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        self.open(NodeKind::Method, None, method.span);
        self.function_parts(&method.function);
        self.close();
    }

    fn visit_constructor(&mut self, ctor: &Constructor) {
        let id = self.open(NodeKind::Method, None, ctor.span);
        self.prop_name(&ctor.key, id);
        if let Some(body) = &ctor.body {
            for param in &ctor.params {
                match param {
                    ParamOrTsParamProp::Param(param) => self.param(&param.pat),
                    ParamOrTsParamProp::TsParamProp(prop) => {
                        self.with_binding(true, |this| prop.param.visit_with(this));
                    }
                }
            }
            self.block(body, Some(Field::Body));
        }
        self.close();
    }

    fn visit_class_prop(&mut self, prop: &ClassProp) {
        let id = self.open(NodeKind::Property, None, prop.span);
        self.prop_name(&prop.key, id);
        if let Some(value) = &prop.value {
            value.visit_with(self);
        }
        self.close();
    }

    fn visit_private_prop(&mut self, prop: &PrivateProp) {
        self.open(NodeKind::Property, None, prop.span);
        if let Some(value) = &prop.value {
            value.visit_with(self);
        }
        self.close();
    }

    fn visit_key_value_prop(&mut self, prop: &KeyValueProp) {
        let id = self.open(NodeKind::Property, None, prop.span());
        self.prop_name(&prop.key, id);
        prop.value.visit_with(self);
        self.close();
    }

    fn visit_method_prop(&mut self, prop: &MethodProp) {
        let id = self.open(NodeKind::Method, None, prop.span());
        self.prop_name(&prop.key, id);
        self.function_parts(&prop.function);
        self.close();
    }

    fn visit_getter_prop(&mut self, prop: &GetterProp) {
        let id = self.open(NodeKind::Method, None, prop.span);
        self.prop_name(&prop.key, id);
        if let Some(body) = &prop.body {
            self.block(body, Some(Field::Body));
        }
        self.close();
    }

    fn visit_setter_prop(&mut self, prop: &SetterProp) {
        let id = self.open(NodeKind::Method, None, prop.span);
        self.prop_name(&prop.key, id);
        if let Some(body) = &prop.body {
            self.param(&prop.param);
            self.block(body, Some(Field::Body));
        }
        self.close();
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        self.block(block, None);
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        self.open(NodeKind::CatchClause, None, clause.span);
        if let Some(param) = &clause.param {
            self.with_binding(true, |this| param.visit_with(this));
        }
        self.block(&clause.body, Some(Field::Body));
        self.close();
    }

    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        self.open(NodeKind::ExpressionStatement, None, stmt.span);
        stmt.expr.visit_with(self);
        self.close();
    }

    fn visit_for_stmt(&mut self, for_stmt: &ForStmt) {
        self.open(NodeKind::For, None, for_stmt.span);
        if let Some(init) = &for_stmt.init {
            self.in_slot(Field::Init, |this| init.visit_with(this));
        }
        if let Some(test) = &for_stmt.test {
            self.in_slot(Field::Test, |this| test.visit_with(this));
        }
        if let Some(update) = &for_stmt.update {
            self.in_slot(Field::Update, |this| update.visit_with(this));
        }
        for_stmt.body.visit_with(self);
        self.close();
    }

    fn visit_labeled_stmt(&mut self, stmt: &LabeledStmt) {
        stmt.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _stmt: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _stmt: &ContinueStmt) {}

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.open(NodeKind::VariableDeclaration, None, decl.span);
        for declarator in &decl.decls {
            self.visit_var_declarator(declarator);
        }
        self.close();
    }

    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        self.open(NodeKind::VariableDeclarator, None, declarator.span);
        match &declarator.name {
            Pat::Ident(binding) => self.ident(&binding.id, Some(Field::Id)),
            pattern => self.with_binding(true, |this| pattern.visit_with(this)),
        }
        if let Some(init) = &declarator.init {
            self.with_binding(false, |this| {
                this.in_slot(Field::Init, |this| init.visit_with(this));
            });
        }
        self.close();
    }

    fn visit_assign_pat(&mut self, pat: &AssignPat) {
        pat.left.visit_with(self);
        self.with_binding(false, |this| pat.right.visit_with(this));
    }

    fn visit_assign_pat_prop(&mut self, prop: &AssignPatProp) {
        prop.key.visit_with(self);
        if let Some(value) = &prop.value {
            self.with_binding(false, |this| value.visit_with(this));
        }
    }

    fn visit_computed_prop_name(&mut self, computed: &ComputedPropName) {
        self.with_binding(false, |this| computed.expr.visit_with(this));
    }

    fn visit_bin_expr(&mut self, expr: &BinExpr) {
        let id = self.open(NodeKind::Binary, None, expr.span);
        self.builder.set_text(id, expr.op.as_str());
        self.in_slot(Field::Left, |this| expr.left.visit_with(this));
        self.in_slot(Field::Right, |this| expr.right.visit_with(this));
        self.close();
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        self.open(NodeKind::Call, None, call.span);
        if let Callee::Expr(callee) = &call.callee {
            self.in_slot(Field::Callee, |this| callee.visit_with(this));
        }
        for arg in &call.args {
            arg.visit_with(self);
        }
        self.close();
    }

    fn visit_member_expr(&mut self, member: &MemberExpr) {
        let id = self.open(NodeKind::Member, None, member.span);
        self.with_binding(false, |this| {
            this.in_slot(Field::Object, |this| member.obj.visit_with(this));
            match &member.prop {
                MemberProp::Ident(name) => this.leaf(
                    NodeKind::Identifier,
                    Some(Field::Property),
                    name.span,
                    Some(name.sym.to_string()),
                ),
                MemberProp::Computed(computed) => {
                    this.builder.set_flags(id, NodeFlags::COMPUTED);
                    this.in_slot(Field::Property, |this| computed.expr.visit_with(this));
                }
                MemberProp::PrivateName(_) => {}
            }
        });
        self.close();
    }

    fn visit_ident(&mut self, ident: &Ident) {
        let field = self.binding.then_some(Field::Binding);
        self.ident(ident, field);
    }

    fn visit_binding_ident(&mut self, binding: &BindingIdent) {
        self.visit_ident(&binding.id);
    }

    fn visit_number(&mut self, number: &Number) {
        let text = self.raw(number.span).map(str::to_string);
        self.leaf(NodeKind::NumberLiteral, None, number.span, text);
    }

    fn visit_str(&mut self, s: &Str) {
        let text = self.raw(s.span).map(unquote);
        self.leaf(NodeKind::StringLiteral, None, s.span, text);
    }

    fn visit_ts_type(&mut self, _ty: &TsType) {}

    fn visit_ts_type_ann(&mut self, _ann: &TsTypeAnn) {}

    fn visit_ts_type_param_decl(&mut self, _decl: &TsTypeParamDecl) {}

    fn visit_ts_type_param_instantiation(&mut self, _args: &TsTypeParamInstantiation) {}
}

fn statement_kind(stmt: &Stmt) -> NodeKind {
    match stmt {
        Stmt::If(_) => NodeKind::If,
        Stmt::ForIn(_) => NodeKind::ForIn,
        Stmt::ForOf(_) => NodeKind::ForOf,
        Stmt::While(_) => NodeKind::While,
        Stmt::DoWhile(_) => NodeKind::DoWhile,
        Stmt::Switch(_) => NodeKind::Switch,
        Stmt::Throw(_) => NodeKind::Throw,
        Stmt::Try(_) => NodeKind::Try,
        Stmt::Break(_) => NodeKind::Break,
        Stmt::Continue(_) => NodeKind::Continue,
        Stmt::Labeled(_) => NodeKind::Labeled,
        Stmt::Empty(_) => NodeKind::Empty,
        Stmt::Debugger(_) => NodeKind::Debugger,
        Stmt::With(_) => NodeKind::With,
        _ => NodeKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Location, SyntaxNode};

    fn parse(code: &str) -> SyntaxTree<'_> {
        SwcBackend.parse(code).unwrap()
    }

    fn find<'t>(tree: &'t SyntaxTree<'_>, kind: NodeKind) -> &'t SyntaxNode {
        tree.descendants(tree.root())
            .into_iter()
            .find(|node| node.kind == kind)
            .unwrap()
    }

    #[test]
    fn lowers_variable_declaration() {
        let tree = parse("const answer = compute(1);");

        let declarator = find(&tree, NodeKind::VariableDeclarator);
        let id = tree.child_by_field(declarator, Field::Id).unwrap();
        let init = tree.child_by_field(declarator, Field::Init).unwrap();
        assert_eq!(id.text(), Some("answer"));
        assert_eq!(init.kind, NodeKind::Call);
    }

    #[test]
    fn lowers_for_loop_slots() {
        let tree = parse("for (let i = 0; i <= arr.length; i++) { use(arr[i]); }");

        let for_node = find(&tree, NodeKind::For);
        let init = tree.child_by_field(for_node, Field::Init).unwrap();
        let test = tree.child_by_field(for_node, Field::Test).unwrap();
        assert_eq!(init.kind, NodeKind::VariableDeclaration);
        assert_eq!(test.kind, NodeKind::Binary);
        assert_eq!(test.text(), Some("<="));

        let right = tree.child_by_field(test, Field::Right).unwrap();
        assert_eq!(right.kind, NodeKind::Member);
        let property = tree.child_by_field(right, Field::Property).unwrap();
        assert_eq!(property.text(), Some("length"));
    }

    #[test]
    fn computed_member_keeps_string_property() {
        let tree = parse("x = items[\"length\"];");

        let member = find(&tree, NodeKind::Member);
        assert!(member.is_computed());
        let property = tree.child_by_field(member, Field::Property).unwrap();
        assert_eq!(property.kind, NodeKind::StringLiteral);
        assert_eq!(property.text(), Some("length"));
    }

    #[test]
    fn function_parameters_and_body() {
        let tree = parse("function add(a, { b }) { return a + b; }");

        let function = find(&tree, NodeKind::FunctionDeclaration);
        let fields: Vec<_> = tree.children(function).map(|child| child.field).collect();
        assert_eq!(
            fields,
            vec![
                Some(Field::Id),
                Some(Field::Param),
                Some(Field::Binding),
                Some(Field::Body)
            ]
        );

        let ret = find(&tree, NodeKind::Return);
        assert!(ret.flags.contains(NodeFlags::HAS_ARGUMENT));
    }

    #[test]
    fn destructuring_defaults_are_references() {
        let tree = parse("const { a = fallback } = options;");

        let identifiers: Vec<_> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|node| node.kind == NodeKind::Identifier)
            .map(|node| (node.text().unwrap().to_string(), node.field))
            .collect();
        assert_eq!(
            identifiers,
            vec![
                ("a".to_string(), Some(Field::Binding)),
                ("fallback".to_string(), None),
                ("options".to_string(), Some(Field::Init)),
            ]
        );
    }

    #[test]
    fn type_annotations_are_dropped() {
        let tree = parse("let count: Counter = 0;\ninterface Counter { value: number }");

        let identifiers = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|node| node.kind == NodeKind::Identifier)
            .count();
        assert_eq!(identifiers, 1);
        assert_eq!(tree.children(tree.root()).nth(1).unwrap().kind, NodeKind::TypeDeclaration);
    }

    #[test]
    fn positions_are_one_based() {
        let tree = parse("\n  console.log(x);");

        let call = find(&tree, NodeKind::Call);
        assert_eq!(call.start, Location::new(2, 3));
    }

    #[test]
    fn fatal_error_reports_location() {
        let err = SwcBackend.parse("const x = 1;\nfunction () {").unwrap_err();

        match err {
            ParseError::Syntax(error) => {
                assert_eq!(error.line, 2);
                assert!(!error.message.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn accepts_jsx() {
        let tree = parse("const el = <Widget label=\"x\" />;");

        let names: Vec<_> = tree
            .descendants(tree.root())
            .into_iter()
            .filter_map(|node| node.text())
            .collect();
        assert!(names.contains(&"Widget"));
    }

    /// Runs `parse` for `code` on a thread with a 2 MiB stack, the size rayon
    /// workers get by default.
    fn parse_on_small_stack(code: String) -> Result<usize, ParseError> {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || SwcBackend.parse(&code).map(|tree| tree.descendants(tree.root()).len()))
            .unwrap()
            .join()
            .unwrap()
    }

    fn nested_parens(levels: usize) -> String {
        format!("x = {}1{};", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn deeply_nested_input_is_refused() {
        let result = parse_on_small_stack(nested_parens(2000));

        match result {
            Err(ParseError::Backend(message)) => assert!(message.contains("2000"), "{message}"),
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[test]
    fn nesting_at_the_limit_parses_on_a_small_stack() {
        let result = parse_on_small_stack(nested_parens(MAX_NESTING - 1));

        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn bracket_depth_ignores_strings_and_comments() {
        assert_eq!(bracket_depth("f(a[0], { b: (c) });"), 3);
        assert_eq!(bracket_depth("s = '((((' + \"[[\\\"[\" + `{{{`;"), 0);
        assert_eq!(bracket_depth("// ((((\n/* [[[[ */ x;"), 0);
        assert_eq!(bracket_depth("))) ((x))"), 2);
    }
}
