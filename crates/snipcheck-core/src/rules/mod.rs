//! Rule system for snippet analysis
//!
//! Node rules react to every node-enter event of the main traversal. The
//! remaining quality rules run as dedicated passes but share the same
//! metadata, configuration and severity handling.

pub mod quality;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::issue::Issue;
use crate::syntax::SyntaxNode;
use crate::visitor::VisitorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Correctness,
    Style,
    /// Reports produced by the engine itself. Cannot be disabled.
    Engine,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Correctness => "correctness",
            RuleCategory::Style => "style",
            RuleCategory::Engine => "engine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub examples: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("node range {start}..{end} does not fall on the source text")]
    InvalidRange { start: usize, end: usize },
    #[error("line {line} is outside the source")]
    LineOutOfRange { line: usize },
}

/// A detector invoked on every node-enter event.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    fn check(&self, node: &SyntaxNode, ctx: &VisitorContext) -> Result<Option<Issue>, RuleError>;
}

pub const SYNTAX_ERROR: RuleMetadata = RuleMetadata {
    name: "syntax-error",
    description: "The snippet could not be parsed",
    category: RuleCategory::Engine,
    severity: Severity::Error,
    examples: None,
};

pub const ANALYZER_ERROR: RuleMetadata = RuleMetadata {
    name: "analyzer-error",
    description: "The analyzer failed internally while processing the snippet",
    category: RuleCategory::Engine,
    severity: Severity::Error,
    examples: None,
};

/// Metadata of every rule the engine can report, in reporting order.
pub fn catalog() -> Vec<RuleMetadata> {
    vec![
        SYNTAX_ERROR,
        quality::UnusedVariable::METADATA,
        quality::ConsoleLog::METADATA,
        quality::OffByOneFor::METADATA,
        quality::MissingSemicolon::METADATA,
        quality::MissingReturn::METADATA,
        quality::DuplicateBlock::METADATA,
        ANALYZER_ERROR,
    ]
}

pub fn find_rule(name: &str) -> Option<RuleMetadata> {
    catalog().into_iter().find(|metadata| metadata.name == name)
}

pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    disabled_rules: HashSet<String>,
    severity_overrides: HashMap<String, Severity>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
        }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn configure(&mut self, config: &RulesConfig) {
        self.disabled_rules.clear();
        self.severity_overrides.clear();

        for name in &config.disabled {
            self.disabled_rules.insert(name.clone());
        }

        for (name, severity) in &config.severity {
            self.severity_overrides.insert(name.clone(), *severity);
        }
    }

    /// Runs every enabled node rule against `node`. A rule that fails is
    /// skipped for this node only.
    pub fn check_node(&self, node: &SyntaxNode, ctx: &VisitorContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for rule in self.rules.iter().filter(|rule| self.should_run_rule(rule.as_ref())) {
            match rule.check(node, ctx) {
                Ok(Some(issue)) => issues.push(self.apply_severity_override(issue)),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(
                        rule = rule.metadata().name,
                        node = %node.kind,
                        error = %err,
                        "skipping rule emission"
                    );
                }
            }
        }

        issues
    }

    fn should_run_rule(&self, rule: &dyn Rule) -> bool {
        self.is_enabled(rule.metadata())
    }

    /// Whether issues of this rule are reported. Engine rules always are.
    pub fn is_enabled(&self, metadata: &RuleMetadata) -> bool {
        metadata.category == RuleCategory::Engine || !self.disabled_rules.contains(metadata.name)
    }

    pub fn is_rule_enabled(&self, name: &str) -> bool {
        find_rule(name).is_some_and(|metadata| self.is_enabled(&metadata))
    }

    pub fn apply_severity_override(&self, mut issue: Issue) -> Issue {
        if let Some(severity) = self.severity_overrides.get(&issue.rule) {
            issue.severity = *severity;
        }
        issue
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[macro_export]
macro_rules! declare_rule {
    (
        $name:ident,
        name = $rule_name:literal,
        description = $desc:literal,
        category = $cat:ident,
        severity = $sev:ident
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::rules::RuleMetadata,
        }

        impl $name {
            pub const METADATA: $crate::rules::RuleMetadata = $crate::rules::RuleMetadata {
                name: $rule_name,
                description: $desc,
                category: $crate::rules::RuleCategory::$cat,
                severity: $crate::rules::Severity::$sev,
                examples: declare_rule!(@examples $($examples)?),
            };

            pub fn new() -> Self {
                Self {
                    metadata: Self::METADATA,
                }
            }

            pub fn metadata(&self) -> &$crate::rules::RuleMetadata {
                &self.metadata
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}
