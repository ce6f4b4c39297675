//! Init command - writes a default snipcheck configuration

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use snipcheck_core::config::{CONFIG_FILENAME, default_config_toml};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let config_path = write_config(&std::env::current_dir()?, self.force)?;
        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            config_path.display().to_string().cyan()
        );
        Ok(())
    }
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file '{}' already exists. Use --force to overwrite.",
            CONFIG_FILENAME
        );
    }

    fs::write(&config_path, default_config_toml())?;
    Ok(config_path)
}
