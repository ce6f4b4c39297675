//! Deterministic static analysis for JavaScript snippets.
//!
//! ```
//! use snipcheck_core::{AnalyzeOptions, analyze};
//!
//! let report = analyze("function f() { const a = 1; return 2; }", &AnalyzeOptions::default());
//! assert!(report.issues.iter().any(|issue| issue.rule == "unused-variable"));
//! ```

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod issue;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod syntax;
pub mod visitor;

pub use analysis::{AnalysisEngine, AnalysisReport, AnalyzeOptions};
pub use issue::Issue;
pub use parser::Backend;
pub use rules::Severity;

/// Analyzes `source` with a default engine and the back end in `options`.
pub fn analyze(source: &str, options: &AnalyzeOptions) -> AnalysisReport {
    AnalysisEngine::new().analyze_with(source, options.backend)
}
