//! Output formatters for analysis reports

pub mod json;
pub mod pretty;

use clap::ValueEnum;
use serde::Serialize;
use snipcheck_core::{Issue, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Issues found in one input. `path` is `-` for stdin.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip)]
    pub source: String,
    pub issues: Vec<Issue>,
}

impl FileReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

pub fn count_all(reports: &[FileReport], severity: Severity) -> usize {
    reports.iter().map(|report| report.count(severity)).sum()
}
