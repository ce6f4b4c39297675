//! Check command - analyzes snippets from files or stdin

use crate::merge;
use crate::output::json::JsonFormatter;
use crate::output::pretty::PrettyFormatter;
use crate::output::{FileReport, OutputFormat, count_all};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use rayon::prelude::*;
use snipcheck_core::analysis::AnalysisEngine;
use snipcheck_core::config::load_config_or_default_with_warnings;
use snipcheck_core::{Backend, Severity};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];
const STDIN_PATH: &str = "-";

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to analyze; `-` or nothing reads stdin
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Parser back end (swc, tree-sitter, tree-sitter-tsx); overrides the config
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<Backend>,

    /// Output format for issues
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Merge issues from a remote analyzer's JSON output (single input only)
    #[arg(long, value_name = "FILE")]
    pub remote: Option<PathBuf>,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let config_result = load_config_or_default_with_warnings(&self.config_dir()?)?;
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        let engine = AnalysisEngine::with_config(&config_result.config);

        let inputs = self.collect_inputs()?;
        if inputs.is_empty() {
            println!("No JavaScript/TypeScript files found.");
            return Ok(());
        }

        let reports = self.analyze(&engine, &inputs)?;

        match self.format {
            OutputFormat::Json => println!("{}", JsonFormatter::new().format(&reports)),
            OutputFormat::Pretty => {
                let output = PrettyFormatter::new().format(&reports);
                if output.is_empty() {
                    println!("{} No issues found", "✓".green().bold());
                } else {
                    print!("{}", output);
                }
            }
        }

        if should_fail(&reports, self.fail_on_warnings) {
            process::exit(1);
        }

        Ok(())
    }

    fn analyze(&self, engine: &AnalysisEngine, inputs: &[Input]) -> Result<Vec<FileReport>> {
        if self.remote.is_some() && inputs.len() != 1 {
            anyhow::bail!(
                "--remote needs exactly one input to merge into, got {}",
                inputs.len()
            );
        }

        let backend = self.backend.unwrap_or(engine.backend());
        let mut reports = inputs
            .par_iter()
            .map(|input| -> Result<FileReport> {
                let (path, source) = read_input(input)?;
                let report = engine.analyze_with(&source, backend);
                tracing::debug!(path = %path, issues = report.issues.len(), "analyzed input");
                Ok(FileReport {
                    path,
                    source,
                    issues: report.issues,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if let (Some(remote), [report]) = (&self.remote, reports.as_mut_slice()) {
            let remote_issues = merge::load_remote(remote)?;
            report.issues = merge::merge(std::mem::take(&mut report.issues), remote_issues);
        }

        Ok(reports)
    }

    fn collect_inputs(&self) -> Result<Vec<Input>> {
        if self.paths.is_empty() {
            return Ok(vec![Input::Stdin]);
        }

        let mut inputs = Vec::new();
        for path in &self.paths {
            if path.as_os_str() == STDIN_PATH {
                if !inputs.contains(&Input::Stdin) {
                    inputs.push(Input::Stdin);
                }
                continue;
            }
            inputs.extend(discover_files(path)?.into_iter().map(Input::File));
        }
        Ok(inputs)
    }

    /// Directory the config lookup starts from: the first analyzed path, or
    /// the working directory for stdin.
    fn config_dir(&self) -> Result<PathBuf> {
        match self.paths.iter().find(|path| path.as_os_str() != STDIN_PATH) {
            Some(path) if path.is_file() => Ok(path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))),
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }
}

fn read_input(input: &Input) -> Result<(String, String)> {
    match input {
        Input::Stdin => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read source from stdin")?;
            Ok((STDIN_PATH.to_string(), source))
        }
        Input::File(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            Ok((path.to_string_lossy().to_string(), source))
        }
    }
}

fn should_fail(reports: &[FileReport], fail_on_warnings: bool) -> bool {
    let has_errors = count_all(reports, Severity::Error) > 0;
    let has_warnings = count_all(reports, Severity::Warn) > 0 && fail_on_warnings;
    has_errors || has_warnings
}

fn discover_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        if is_supported_file(path) {
            return Ok(vec![path.to_path_buf()]);
        } else {
            return Ok(vec![]);
        }
    }

    let files: Vec<PathBuf> = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_supported_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    Ok(files)
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name == "node_modules")
        .unwrap_or(false)
}
