//! Analysis engine for snippet analysis and issue generation
//!
//! Runs, in order: parsing, one scope-aware traversal feeding the node rules,
//! the missing-return pass over the collected functions, and the
//! duplicate-block pass. Their issues are deduplicated into one report.

use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::aggregate::dedupe;
use crate::config::Config;
use crate::issue::Issue;
use crate::parser::{self, Backend, ParseBackend, ParseError};
use crate::rules::quality::{
    ConsoleLog, DuplicateBlock, FunctionRecord, MissingReturn, MissingSemicolon, OffByOneFor,
    UnusedVariable,
};
use crate::rules::{ANALYZER_ERROR, RuleRegistry, SYNTAX_ERROR, Severity};
use crate::semantic::{
    ScopeKind, ScopeTracker, declared_name, hoisted_names, is_declaration_site, parameter_names,
};
use crate::syntax::{Field, Location, NodeKind, SyntaxNode};
use crate::visitor::{SyntaxVisitor, VisitorContext, walk_tree};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub backend: Backend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
}

impl AnalysisReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn rules(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.rule.as_str()).collect()
    }
}

pub struct AnalysisEngine {
    registry: RuleRegistry,
    backend: Backend,
    max_depth: usize,
    max_source_chars: usize,
    unused_variable: UnusedVariable,
    missing_return: MissingReturn,
    duplicate_block: DuplicateBlock,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let mut registry = create_default_registry(config);
        registry.configure(&config.rules);
        Self {
            registry,
            backend: config.backend,
            max_depth: config.max_depth,
            max_source_chars: config.duplicate_block.max_source_chars,
            unused_variable: UnusedVariable::new(),
            missing_return: MissingReturn::new(),
            duplicate_block: DuplicateBlock::new(),
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Analyzes `source` with the configured back end.
    pub fn analyze(&self, source: &str) -> AnalysisReport {
        self.analyze_with(source, self.backend)
    }

    pub fn analyze_with(&self, source: &str, backend: Backend) -> AnalysisReport {
        self.analyze_with_parser(source, parser::backend(backend))
    }

    /// Analyzes `source` with any parser back end. Never panics: an internal
    /// failure is reported as a single `analyzer-error` issue.
    pub fn analyze_with_parser(&self, source: &str, parser: &dyn ParseBackend) -> AnalysisReport {
        let span = tracing::debug_span!("analyze", backend = parser.name(), bytes = source.len());
        let _guard = span.enter();

        let issues = match panic::catch_unwind(AssertUnwindSafe(|| self.run(source, parser))) {
            Ok(issues) => issues,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(reason = %reason, "analysis panicked");
                vec![analyzer_error(format!("Internal analyzer failure: {reason}"))]
            }
        };

        AnalysisReport { issues }
    }

    fn run(&self, source: &str, parser: &dyn ParseBackend) -> Vec<Issue> {
        let tree = match parser.parse(source) {
            Ok(tree) => tree,
            Err(ParseError::Syntax(err)) => {
                tracing::debug!(error = %err, "snippet does not parse");
                return vec![
                    Issue::from_rule(&SYNTAX_ERROR, err.message)
                        .at(Location::new(err.line, err.column))
                        .with_suggestion("Fix syntax error"),
                ];
            }
            Err(err @ ParseError::Backend(_)) => {
                tracing::warn!(error = %err, "parser back end failed");
                return vec![analyzer_error(err.to_string())];
            }
        };
        let ctx = VisitorContext::new(&tree);

        let mut pass = TraversalPass {
            engine: self,
            scopes: ScopeTracker::new(),
            functions: Vec::new(),
            issues: Vec::new(),
        };
        let walk = walk_tree(&mut pass, &ctx, self.max_depth);
        let TraversalPass {
            functions,
            mut issues,
            ..
        } = pass;
        if let Err(err) = walk {
            tracing::debug!(error = %err, "traversal aborted");
            issues.push(analyzer_error(err.to_string()));
        }

        issues.extend(self.missing_return_pass(&functions, &ctx));
        issues.extend(self.duplicate_block_pass(&ctx));

        dedupe(issues)
    }

    fn missing_return_pass(&self, functions: &[FunctionRecord], ctx: &VisitorContext) -> Vec<Issue> {
        if !self.registry.is_enabled(self.missing_return.metadata()) {
            return Vec::new();
        }

        let found: Result<Vec<_>, _> = functions
            .iter()
            .map(|&record| {
                self.missing_return
                    .check_function(record, ctx, self.max_depth)
            })
            .collect();

        match found {
            Ok(issues) => issues
                .into_iter()
                .flatten()
                .map(|issue| self.registry.apply_severity_override(issue))
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "dropping missing-return results");
                Vec::new()
            }
        }
    }

    fn duplicate_block_pass(&self, ctx: &VisitorContext) -> Vec<Issue> {
        if !self.registry.is_enabled(self.duplicate_block.metadata()) {
            return Vec::new();
        }

        match self.duplicate_block.find(ctx, self.max_source_chars) {
            Ok(issues) => issues
                .into_iter()
                .map(|issue| self.registry.apply_severity_override(issue))
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "dropping duplicate-block results");
                Vec::new()
            }
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn create_default_registry(config: &Config) -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.register(Box::new(ConsoleLog::with_names(
        config.console_log.objects.clone(),
        config.console_log.methods.clone(),
    )));
    registry.register(Box::new(OffByOneFor::new()));
    registry.register(Box::new(MissingSemicolon::new()));

    registry
}

fn analyzer_error(message: impl Into<String>) -> Issue {
    Issue::from_rule(&ANALYZER_ERROR, message)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The single depth-first walk: scope tracking, function collection and the
/// node rules.
struct TraversalPass<'e> {
    engine: &'e AnalysisEngine,
    scopes: ScopeTracker,
    functions: Vec<FunctionRecord>,
    issues: Vec<Issue>,
}

impl TraversalPass<'_> {
    fn open_scope(&mut self, kind: ScopeKind, node: &SyntaxNode, ctx: &VisitorContext) {
        self.scopes.enter_scope(kind, Some(node.id));

        let node = ctx.node(node.id);
        let names = match kind {
            ScopeKind::Function => parameter_names(node, ctx),
            ScopeKind::Program | ScopeKind::Block => hoisted_names(node, ctx),
            ScopeKind::Catch => Vec::new(),
        };
        for name in names {
            self.scopes.declare(name);
        }
    }

    fn close_scope(&mut self, ctx: &VisitorContext) {
        let Some(scope) = self.scopes.exit_scope() else {
            return;
        };
        let engine = self.engine;
        if !engine.registry.is_enabled(engine.unused_variable.metadata()) {
            return;
        }

        self.issues.extend(
            engine
                .unused_variable
                .report(&scope, ctx)
                .into_iter()
                .map(|issue| engine.registry.apply_severity_override(issue)),
        );
    }
}

impl SyntaxVisitor for TraversalPass<'_> {
    fn enter(&mut self, node: &SyntaxNode, ctx: &VisitorContext) -> ControlFlow<()> {
        match node.kind {
            NodeKind::Identifier => {
                if !is_declaration_site(node, ctx.parent(node)) {
                    if let Some(name) = node.text() {
                        self.scopes.reference(name);
                    }
                }
            }
            NodeKind::VariableDeclarator | NodeKind::FunctionDeclaration => {
                if let Some(name) = declared_name(node, ctx) {
                    self.scopes.declare(name);
                }
            }
            _ => {}
        }

        if let Some(kind) = ScopeKind::for_node(node.kind) {
            self.open_scope(kind, node, ctx);
        }

        if node.kind.is_function() {
            let body = ctx
                .child_with_field(node, Field::Body)
                .filter(|body| body.kind == NodeKind::Block);
            if let Some(body) = body {
                self.functions.push(FunctionRecord {
                    node: node.id,
                    body: body.id,
                });
            }
        }

        self.issues.extend(self.engine.registry.check_node(node, ctx));
        ControlFlow::Continue(())
    }

    fn leave(&mut self, node: &SyntaxNode, ctx: &VisitorContext) {
        if node.kind.opens_scope() {
            self.close_scope(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::parser::SyntaxError;
    use crate::syntax::SyntaxTree;
    use std::collections::HashMap;

    fn analyze(code: &str) -> AnalysisReport {
        AnalysisEngine::new().analyze(code)
    }

    fn messages(report: &AnalysisReport, rule: &str) -> Vec<String> {
        report
            .issues
            .iter()
            .filter(|issue| issue.rule == rule)
            .map(|issue| issue.message.clone())
            .collect()
    }

    #[test]
    fn syntax_error_short_circuits() {
        let report = analyze("function() {");

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.rule, "syntax-error");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.suggestion.as_deref(), Some("Fix syntax error"));
        assert!(issue.location.is_some());
        assert!(report.has_errors());
    }

    #[test]
    fn reports_unused_local() {
        let report = analyze("function f(){ const a = 1; return 2; }\nf();");

        assert_eq!(
            messages(&report, "unused-variable"),
            vec!["Variable \"a\" is declared but never used."]
        );
    }

    #[test]
    fn used_local_is_not_reported() {
        let report = analyze("function f(){ const a = 1; return a; }\nf();");

        assert!(messages(&report, "unused-variable").is_empty());
    }

    #[test]
    fn unused_local_is_located_at_its_scope() {
        let report = analyze("function f() {\n  if (x) {\n    let tmp = 1;\n  }\n}\nf();");

        let issue = report
            .issues
            .iter()
            .find(|issue| issue.rule == "unused-variable")
            .unwrap();
        assert_eq!(issue.location, Some(Location::new(2, 10)));
    }

    #[test]
    fn unused_parameters_are_reported() {
        let report = analyze("function f(a, b) { return b; }\nf();");

        assert_eq!(
            messages(&report, "unused-variable"),
            vec!["Variable \"a\" is declared but never used."]
        );
    }

    #[test]
    fn later_declarations_resolve_earlier_uses() {
        let report = analyze("run();\nfunction run() { return helper(); }\nfunction helper() { return 1; }");

        assert!(messages(&report, "unused-variable").is_empty());
    }

    #[test]
    fn shadowed_names_resolve_to_innermost_scope() {
        let report = analyze("const x = 1;\nfunction f() { const x = 2; return x; }\nf();");

        assert_eq!(
            messages(&report, "unused-variable"),
            vec!["Variable \"x\" is declared but never used."]
        );
        let issue = &report.issues[0];
        assert_eq!(issue.location, Some(Location::new(1, 1)));
    }

    #[test]
    fn exported_declarations_are_not_reported() {
        let report = analyze("export const a = 1;\nexport function f() {}");

        assert!(messages(&report, "unused-variable").is_empty());
    }

    #[test]
    fn unused_class_declarations_are_not_reported() {
        for backend in Backend::ALL {
            let report = AnalysisEngine::new().analyze_with("class Foo {}", backend);

            assert!(report.issues.is_empty(), "{backend}: {:?}", report.issues);
        }
    }

    #[test]
    fn free_names_are_never_reported() {
        let report = analyze("window.alert(document.title);");

        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn console_calls_are_reported_per_line() {
        let report = analyze("console.log(1);\nconsole.log(2);\nconsole.log(3);");

        let lines: Vec<_> = report
            .issues
            .iter()
            .filter(|issue| issue.rule == "console-log")
            .filter_map(|issue| issue.location.map(|location| location.line))
            .collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn off_by_one_loop() {
        let flagged = analyze("const arr = [];\nfor(let i=0;i<=arr.length;i++){ log(arr[i]); }");
        let clean = analyze("const arr = [];\nfor(let i=0;i<arr.length;i++){ log(arr[i]); }");

        assert_eq!(messages(&flagged, "off-by-one-for").len(), 1);
        assert!(messages(&clean, "off-by-one-for").is_empty());
    }

    #[test]
    fn missing_return_after_guarded_return() {
        let flagged = analyze("function f(x) { if (x) { return 1; } }\nf();");
        let clean = analyze("function f(x) { if (x) { return 1; } return 0; }\nf();");

        assert_eq!(messages(&flagged, "missing-return").len(), 1);
        assert!(messages(&clean, "missing-return").is_empty());
    }

    #[test]
    fn duplicate_blocks_across_functions() {
        let code = "function a() { x(); y(); z(); }\nfunction b() { x(); y(); z(); }\na(); b();";

        let report = analyze(code);

        assert_eq!(
            messages(&report, "duplicate-block"),
            vec!["Similar code block appears 2 times. Consider extracting a function."]
        );
    }

    #[test]
    fn oversized_sources_skip_duplicate_detection_only() {
        let config = Config {
            duplicate_block: crate::config::DuplicateBlockConfig { max_source_chars: 10 },
            ..Default::default()
        };
        let code = "function a() { x(); y(); z(); }\nfunction b() { x(); y(); z(); }\nconsole.log(a, b);";

        let report = AnalysisEngine::with_config(&config).analyze(code);

        assert!(messages(&report, "duplicate-block").is_empty());
        assert_eq!(messages(&report, "console-log").len(), 1);
    }

    #[test]
    fn pass_order_is_traversal_then_missing_return_then_duplicates() {
        let code = "function a(x) { if (x) { return 1; } p(); q(); r(); }\n\
                    function b() { p(); q(); r(); }\n\
                    console.log(a, b);";

        let report = analyze(code);

        assert_eq!(
            report.rules(),
            vec!["console-log", "missing-return", "duplicate-block"]
        );
    }

    #[test]
    fn disabled_rules_are_silent() {
        let config = Config {
            rules: RulesConfig {
                disabled: vec![
                    "console-log".to_string(),
                    "unused-variable".to_string(),
                    "missing-return".to_string(),
                    "duplicate-block".to_string(),
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        let code = "function a(x) { const u = 1; if (x) { return 1; } }\nconsole.log(1);";

        let report = AnalysisEngine::with_config(&config).analyze(code);

        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn severity_overrides_apply_to_every_pass() {
        let config = Config {
            rules: RulesConfig {
                severity: HashMap::from([
                    ("unused-variable".to_string(), Severity::Error),
                    ("missing-return".to_string(), Severity::Info),
                ]),
                ..Default::default()
            },
            ..Default::default()
        };
        let code = "function f(x) { const u = 1; if (x) { return 1; } }\nf();";

        let report = AnalysisEngine::with_config(&config).analyze(code);

        for issue in &report.issues {
            match issue.rule.as_str() {
                "unused-variable" => assert_eq!(issue.severity, Severity::Error),
                "missing-return" => assert_eq!(issue.severity, Severity::Info),
                other => panic!("unexpected rule {other}"),
            }
        }
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn configured_console_names_are_used() {
        let mut config = Config::default();
        config.console_log.methods = vec!["debug".to_string()];

        let report = AnalysisEngine::with_config(&config).analyze("console.log(1);\nconsole.debug(2);");

        assert_eq!(
            messages(&report, "console-log"),
            vec!["console.debug found. Remove or replace with logger."]
        );
    }

    #[test]
    fn deep_nesting_reports_analyzer_error_and_keeps_earlier_issues() {
        let config = Config {
            max_depth: 8,
            ..Default::default()
        };
        let code = format!("console.log(1);\n{}x;{}", "{".repeat(20), "}".repeat(20));

        let report = AnalysisEngine::with_config(&config).analyze(&code);

        assert_eq!(report.rules(), vec!["console-log", "analyzer-error"]);
        assert_eq!(report.issues[1].severity, Severity::Error);
    }

    #[test]
    fn deeply_nested_swc_input_reports_analyzer_error() {
        let code = format!("x = {}1{};", "(".repeat(2000), ")".repeat(2000));

        let report = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || AnalysisEngine::new().analyze_with(&code, Backend::Swc))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(report.rules(), vec!["analyzer-error"]);
        assert!(report.issues[0].message.contains("nesting depth 2000"));
    }

    #[test]
    fn analysis_is_deterministic() {
        let code = "function f(a) { console.log(a); for (let i = 0; i <= a.length; i++) {} }";
        let engine = AnalysisEngine::new();

        for backend in Backend::ALL {
            assert_eq!(
                engine.analyze_with(code, backend),
                engine.analyze_with(code, backend)
            );
        }
    }

    #[test]
    fn report_serializes_as_issue_list() {
        let report = analyze("console.log(1);");

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["issues"][0]["rule"], "console-log");
        assert_eq!(json["issues"][0]["location"]["line"], 1);
    }

    struct FailingParser(ParseError);

    impl ParseBackend for FailingParser {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn parse<'src>(&self, _source: &'src str) -> Result<SyntaxTree<'src>, ParseError> {
            Err(self.0.clone())
        }
    }

    struct PanickingParser;

    impl ParseBackend for PanickingParser {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn parse<'src>(&self, _source: &'src str) -> Result<SyntaxTree<'src>, ParseError> {
            panic!("grammar table corrupted")
        }
    }

    #[test]
    fn syntax_error_from_custom_parser_is_located() {
        let parser = FailingParser(ParseError::Syntax(SyntaxError {
            message: "Unexpected token".to_string(),
            line: 3,
            column: 7,
        }));

        let report = AnalysisEngine::new().analyze_with_parser("x", &parser);

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].message, "Unexpected token");
        assert_eq!(report.issues[0].location, Some(Location::new(3, 7)));
    }

    #[test]
    fn unavailable_backend_reports_analyzer_error() {
        let parser = FailingParser(ParseError::Backend("grammar missing".to_string()));

        let report = AnalysisEngine::new().analyze_with_parser("x", &parser);

        assert_eq!(report.rules(), vec!["analyzer-error"]);
        assert!(report.issues[0].message.contains("grammar missing"));
    }

    #[test]
    fn panics_are_contained() {
        let report = AnalysisEngine::new().analyze_with_parser("x", &PanickingParser);

        assert_eq!(report.rules(), vec!["analyzer-error"]);
        assert!(report.issues[0].message.contains("grammar table corrupted"));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalysisEngine>();
    }
}
