//! JSON output formatter for programmatic integration

use serde::Serialize;
use snipcheck_core::Severity;

use super::{FileReport, count_all};

#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub version: &'static str,
    pub summary: JsonSummary,
    pub files: &'a [FileReport],
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub files_with_issues: usize,
    pub total_issues: usize,
    pub by_severity: SeverityCounts,
}

#[derive(Serialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warn: usize,
    pub info: usize,
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, reports: &[FileReport]) -> String {
        let output = JsonOutput {
            version: env!("CARGO_PKG_VERSION"),
            summary: summarize(reports),
            files: reports,
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(reports: &[FileReport]) -> JsonSummary {
    JsonSummary {
        total_files: reports.len(),
        files_with_issues: reports
            .iter()
            .filter(|report| !report.issues.is_empty())
            .count(),
        total_issues: reports.iter().map(|report| report.issues.len()).sum(),
        by_severity: SeverityCounts {
            error: count_all(reports, Severity::Error),
            warn: count_all(reports, Severity::Warn),
            info: count_all(reports, Severity::Info),
        },
    }
}
