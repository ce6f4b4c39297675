//! Pretty formatter for human-readable terminal output
//!
//! Displays issues with colors, the offending source line and a summary.

use colored::{ColoredString, Colorize};
use snipcheck_core::{Issue, Severity};

use super::{FileReport, count_all};

pub struct PrettyFormatter;

impl PrettyFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, reports: &[FileReport]) -> String {
        let mut output = String::new();

        for report in reports {
            for issue in &report.issues {
                output.push_str(&self.format_issue(report, issue));
                output.push('\n');
            }
        }

        if reports.iter().any(|report| !report.issues.is_empty()) {
            output.push_str(&self.format_summary(reports));
        }

        output
    }

    fn format_issue(&self, report: &FileReport, issue: &Issue) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{}[{}]: {}",
            self.colorize_severity(issue.severity),
            issue.rule.dimmed(),
            issue.message
        ));

        let Some(location) = issue.location else {
            lines.push(format!("  {} {}", "-->".blue(), report.path));
            if let Some(suggestion) = &issue.suggestion {
                lines.push(format!("  {} {} {}", "=".blue(), "suggestion:".green(), suggestion));
            }
            return lines.join("\n");
        };

        lines.push(format!(
            "  {} {}:{}:{}",
            "-->".blue(),
            report.path,
            location.line,
            location.column
        ));

        let padding = " ".repeat(location.line.to_string().len());

        if let Some(source_line) = report.source.lines().nth(location.line.saturating_sub(1)) {
            lines.push(format!("{} {}", padding, "|".blue()));
            lines.push(format!(
                "{} {} {}",
                location.line.to_string().blue(),
                "|".blue(),
                source_line
            ));
            lines.push(format!(
                "{} {} {}{}",
                padding,
                "|".blue(),
                " ".repeat(location.column.saturating_sub(1)),
                "^".red()
            ));
            lines.push(format!("{} {}", padding, "|".blue()));
        }

        if let Some(suggestion) = &issue.suggestion {
            lines.push(format!(
                "{} {} {} {}",
                padding,
                "=".blue(),
                "suggestion:".green(),
                suggestion
            ));
        }

        lines.join("\n")
    }

    fn colorize_severity(&self, severity: Severity) -> ColoredString {
        match severity {
            Severity::Error => "error".red().bold(),
            Severity::Warn => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        }
    }

    fn format_summary(&self, reports: &[FileReport]) -> String {
        let total: usize = reports.iter().map(|report| report.issues.len()).sum();
        let error_count = count_all(reports, Severity::Error);
        let warning_count = count_all(reports, Severity::Warn);

        let errors_str = if error_count == 1 {
            format!("{} error", error_count)
        } else {
            format!("{} errors", error_count)
        };

        let warnings_str = if warning_count == 1 {
            format!("{} warning", warning_count)
        } else {
            format!("{} warnings", warning_count)
        };

        let problems_str = if total == 1 { "problem" } else { "problems" };

        format!(
            "\nFound {} {} ({}, {})\n",
            total.to_string().bold(),
            problems_str,
            errors_str.red(),
            warnings_str.yellow()
        )
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}
