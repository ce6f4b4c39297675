//! Issues reported by the analysis passes.

use serde::{Deserialize, Serialize};

use crate::rules::{RuleMetadata, Severity};
use crate::syntax::Location;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub rule: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub severity: Severity,
}

/// Identity of an issue for deduplication.
pub type IssueKey = (String, String, Option<Location>);

impl Issue {
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
            location: None,
            suggestion: None,
            severity,
        }
    }

    /// Issue for `metadata` with the rule's default severity.
    pub fn from_rule(metadata: &RuleMetadata, message: impl Into<String>) -> Self {
        Self::new(metadata.name, metadata.severity, message)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn key(&self) -> IssueKey {
        (self.rule.clone(), self.message.clone(), self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let issue = Issue::new("duplicate-block", Severity::Warn, "Similar code");

        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "rule": "duplicate-block",
                "message": "Similar code",
                "severity": "warn"
            })
        );
    }

    #[test]
    fn located_issue_serializes_line_and_column() {
        let issue = Issue::new("console-log", Severity::Info, "console.log found.")
            .at(Location::new(2, 5))
            .with_suggestion("Use a logger");

        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["location"], serde_json::json!({ "line": 2, "column": 5 }));
        assert_eq!(json["suggestion"], "Use a logger");
        assert_eq!(json["severity"], "info");
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let issue: Issue =
            serde_json::from_str(r#"{"rule":"r","message":"m","severity":"error"}"#).unwrap();

        assert_eq!(issue.location, None);
        assert_eq!(issue.suggestion, None);
        assert_eq!(issue.severity, Severity::Error);
    }

    #[test]
    fn key_ignores_severity_and_suggestion() {
        let a = Issue::new("r", Severity::Info, "m").at(Location::new(1, 1));
        let b = Issue::new("r", Severity::Error, "m")
            .at(Location::new(1, 1))
            .with_suggestion("s");

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), a.clone().at(Location::new(1, 2)).key());
    }
}
