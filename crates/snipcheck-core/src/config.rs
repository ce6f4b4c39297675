//! Configuration loading and parsing for snipcheck
//!
//! Provides functionality to load and parse `snipcheck.toml` configuration files.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::parser::Backend;
use crate::rules::Severity;
use crate::rules::quality::{console_log, duplicate_block};
use crate::visitor::DEFAULT_MAX_DEPTH;

pub const CONFIG_FILENAME: &str = "snipcheck.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "backend",
    "max_depth",
    "rules",
    "console_log",
    "duplicate_block",
];
const KNOWN_RULES_KEYS: &[&str] = &["disabled", "severity"];
const KNOWN_CONSOLE_LOG_KEYS: &[&str] = &["objects", "methods"];
const KNOWN_DUPLICATE_BLOCK_KEYS: &[&str] = &["max_source_chars"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub max_depth: usize,
    pub rules: RulesConfig,
    pub console_log: ConsoleLogConfig,
    pub duplicate_block: DuplicateBlockConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            rules: RulesConfig::default(),
            console_log: ConsoleLogConfig::default(),
            duplicate_block: DuplicateBlockConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    pub disabled: Vec<String>,
    pub severity: HashMap<String, Severity>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleLogConfig {
    pub objects: Vec<String>,
    pub methods: Vec<String>,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            objects: console_log::DEFAULT_OBJECTS.iter().map(|s| s.to_string()).collect(),
            methods: console_log::DEFAULT_METHODS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuplicateBlockConfig {
    pub max_source_chars: usize,
}

impl Default for DuplicateBlockConfig {
    fn default() -> Self {
        Self {
            max_source_chars: duplicate_block::DEFAULT_MAX_SOURCE_CHARS,
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&content).map_err(|message| ConfigError::ParseError {
        path: path.to_path_buf(),
        message,
    })
}

/// Parses configuration text. The error is the TOML parser's message.
pub fn parse_config(content: &str) -> Result<ConfigResult, String> {
    let config: Config = toml::from_str(content).map_err(|e| e.message().to_string())?;
    let warnings = detect_unknown_keys(content);

    Ok(ConfigResult { config, warnings })
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    let sections = [
        ("rules", KNOWN_RULES_KEYS),
        ("console_log", KNOWN_CONSOLE_LOG_KEYS),
        ("duplicate_block", KNOWN_DUPLICATE_BLOCK_KEYS),
    ];
    for (section, known_keys) in sections {
        if let Some(toml::Value::Table(entries)) = table.get(section) {
            for key in entries.keys() {
                if !known_keys.contains(&key.as_str()) {
                    warnings.push(format!("Unknown config option in [{}]: '{}'", section, key));
                }
            }
        }
    }

    if let Some(toml::Value::Table(rules)) = table.get("rules") {
        warnings.extend(unknown_rule_references(rules));
    }

    warnings
}

fn unknown_rule_references(rules: &toml::Table) -> Vec<String> {
    let known: HashSet<&str> = crate::rules::catalog()
        .iter()
        .map(|metadata| metadata.name)
        .collect();
    let mut warnings = Vec::new();

    if let Some(toml::Value::Array(disabled)) = rules.get("disabled") {
        for name in disabled.iter().filter_map(toml::Value::as_str) {
            if !known.contains(name) {
                warnings.push(format!("Unknown rule in [rules].disabled: '{}'", name));
            }
        }
    }

    if let Some(toml::Value::Table(severity)) = rules.get("severity") {
        for name in severity.keys() {
            if !known.contains(name.as_str()) {
                warnings.push(format!("Unknown rule in [rules.severity]: '{}'", name));
            }
        }
    }

    warnings
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> Result<ConfigResult, ConfigError> {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path),
        None => Ok(ConfigResult::default()),
    }
}

/// Commented default configuration, as written by `snipcheck init`.
pub fn default_config_toml() -> String {
    format!(
        r#"# snipcheck configuration

# Parser back end: "swc", "tree-sitter" or "tree-sitter-tsx"
backend = "swc"

# Maximum syntax tree nesting before analysis gives up
max_depth = {max_depth}

[rules]
# Rules to turn off, e.g. ["missing-semicolon"]
disabled = []

[rules.severity]
# Override the reported severity: "info", "warn" or "error"
# console-log = "warn"

[console_log]
objects = ["console"]
methods = ["log"]

[duplicate_block]
# Sources longer than this many characters skip duplicate detection
max_source_chars = {max_source_chars}
"#,
        max_depth = DEFAULT_MAX_DEPTH,
        max_source_chars = duplicate_block::DEFAULT_MAX_SOURCE_CHARS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn load_config_from_file() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
backend = "tree-sitter"
max_depth = 64

[rules]
disabled = ["missing-semicolon"]

[rules.severity]
console-log = "error"

[console_log]
objects = ["console", "logger"]

[duplicate_block]
max_source_chars = 5000
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.backend, Backend::TreeSitter);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.rules.disabled, vec!["missing-semicolon"]);
        assert_eq!(
            config.rules.severity.get("console-log"),
            Some(&Severity::Error)
        );
        assert_eq!(config.console_log.objects, vec!["console", "logger"]);
        assert_eq!(config.console_log.methods, vec!["log"]);
        assert_eq!(config.duplicate_block.max_source_chars, 5000);
    }

    #[test]
    fn defaults_match_engine_constants() {
        let config = Config::default();

        assert_eq!(config.backend, Backend::Swc);
        assert_eq!(config.max_depth, 1024);
        assert_eq!(config.duplicate_block.max_source_chars, 200_000);
        assert_eq!(config.console_log.objects, vec!["console"]);
        assert_eq!(config.console_log.methods, vec!["log"]);
        assert!(config.rules.disabled.is_empty());
    }

    #[test]
    fn default_config_when_missing() {
        let dir = create_temp_dir();

        let result = load_config_or_default_with_warnings(dir.path()).unwrap();

        assert_eq!(result.config, Config::default());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn error_on_invalid_toml() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "this is not valid { toml }").unwrap();

        let result = load_config(&config_path);

        match result.unwrap_err() {
            ConfigError::ParseError { path, message } => {
                assert_eq!(path, config_path);
                assert!(!message.is_empty());
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn error_on_unknown_backend() {
        assert!(parse_config("backend = \"esprima\"").is_err());
    }

    #[test]
    fn read_error_for_missing_file() {
        let dir = create_temp_dir();

        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn find_config_file_in_parent_directory() {
        let parent = create_temp_dir();
        let child = parent.path().join("subdir");
        fs::create_dir(&child).unwrap();
        let config_path = parent.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        let found = find_config_file(&child);

        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn find_config_file_returns_none_when_not_found() {
        let dir = create_temp_dir();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn unknown_keys_produce_warnings() {
        let result = parse_config(
            r#"
colour = true

[rules]
enabled = ["x"]

[console_log]
levels = ["debug"]
"#,
        )
        .unwrap();

        assert_eq!(
            result.warnings,
            vec![
                "Unknown config option: 'colour'",
                "Unknown config option in [rules]: 'enabled'",
                "Unknown config option in [console_log]: 'levels'",
            ]
        );
    }

    #[test]
    fn unknown_rule_names_produce_warnings() {
        let result = parse_config(
            r#"
[rules]
disabled = ["no-var", "console-log"]

[rules.severity]
no-eval = "warn"
"#,
        )
        .unwrap();

        assert_eq!(
            result.warnings,
            vec![
                "Unknown rule in [rules].disabled: 'no-var'",
                "Unknown rule in [rules.severity]: 'no-eval'",
            ]
        );
    }

    #[test]
    fn default_config_toml_round_trips() {
        let result = parse_config(&default_config_toml()).unwrap();

        assert_eq!(result.config, Config::default());
        assert!(result.warnings.is_empty());
    }
}
