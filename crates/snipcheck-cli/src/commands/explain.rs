//! Explain command - provides detailed explanation of a rule

use clap::Args;
use colored::Colorize;
use snipcheck_core::analysis::AnalysisEngine;
use snipcheck_core::config::load_config_or_default_with_warnings;
use snipcheck_core::rules::{self, RuleMetadata, RuleRegistry, Severity};
use std::env;

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "RULE",
        help = "Rule to explain (e.g., \"console-log\", \"off-by-one-for\")"
    )]
    pub rule: String,
}

impl ExplainArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let cwd = env::current_dir()?;
        let config_result = load_config_or_default_with_warnings(&cwd)?;
        let engine = AnalysisEngine::with_config(&config_result.config);

        match rules::find_rule(&self.rule) {
            Some(metadata) => {
                print!("{}", explain_rule(&metadata, engine.registry()));
                Ok(())
            }
            None => {
                eprintln!(
                    "{} Unknown rule '{}'",
                    "error:".red().bold(),
                    self.rule
                );
                eprintln!();
                eprintln!("Available rules:");
                for metadata in rules::catalog() {
                    eprintln!("  {} ({})", metadata.name, metadata.category.as_str());
                }

                std::process::exit(1);
            }
        }
    }
}

fn explain_rule(metadata: &RuleMetadata, registry: &RuleRegistry) -> String {
    let mut lines = vec![
        String::new(),
        format!("Rule {}", metadata.name).bold().to_string(),
        String::new(),
        format!("  {}: {}", "Description".cyan(), metadata.description),
        format!("  {}: {}", "Category".cyan(), metadata.category.as_str()),
        format!("  {}: {}", "Severity".cyan(), format_severity(metadata.severity)),
    ];

    if let Some(examples) = metadata.examples {
        lines.push(String::new());
        lines.push(format!("  {}:", "Examples".cyan()));
        lines.extend(examples.lines().map(|line| format!("    {}", line)));
    }

    lines.push(String::new());
    let status = if registry.is_rule_enabled(metadata.name) {
        "enabled".green()
    } else {
        "disabled".red()
    };
    lines.push(format!("  {}: {}", "Status".cyan(), status));
    lines.push(String::new());

    lines.join("\n")
}

fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warn => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
    }
}
