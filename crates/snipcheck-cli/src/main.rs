//! snipcheck CLI - Command-line interface for the snipcheck analyzer
//!
//! Runs the snippet analyzer over files or stdin and reports the issues found.

mod commands;
mod logging;
mod merge;
mod output;

use clap::Parser;
use commands::Commands;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "snipcheck",
    author,
    version,
    about = "Deterministic static analyzer for JavaScript snippets",
    long_about = "snipcheck finds common mistakes in short JavaScript and TypeScript snippets:\n\
                  unused variables, debug output, off-by-one loop bounds, missing returns\n\
                  and duplicated blocks.\n\n\
                  Configure logging with --log-level and --log-json."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "warn",
        help = "Set the log level"
    )]
    pub log_level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level, cli.log_json);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}
