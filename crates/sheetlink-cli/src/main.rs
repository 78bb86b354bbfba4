//! sheetlink CLI
//!
//! Command-line interface for sheetlink - turn spreadsheets into linked notes.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod fetch;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "sheetlink")]
#[command(about = "sheetlink - Turn spreadsheet tables into interlinked markdown notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every table, write documents and link them
    Build(BuildArgs),
    /// Fetch every table and print the reference catalog
    Catalog,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Remove previous output before building (dot entries are kept)
    #[arg(long)]
    pub clean: bool,

    /// Leave existing documents untouched instead of re-rendering them
    #[arg(long)]
    pub keep_existing: bool,

    /// Worker threads
    #[arg(long)]
    pub workers: Option<usize>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (output_dir, extension, collection, workers, keep_existing)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Build(args) => commands::build::build(config_path, args, &output).await,
        Commands::Catalog => commands::catalog::show(config_path, &output).await,
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        },
    }
}

/// Log to stderr; `RUST_LOG` wins over the `-v` count
fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sheetlink_core={},sheetlink_cli={}",
            log_level, log_level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
