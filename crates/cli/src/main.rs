//! Gridcheck CLI - Main Entry Point
//!
//! Runs declarative UI-to-API field validations over collaborator-
//! supplied JSON documents. Exit codes: 0 pass, 1 validation failure,
//! 2 configuration or input error.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{check_config, run_validation, RunArgs};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "gridcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a validation over config, entity set, response, and snapshot
    Run(RunArgs),

    /// Validate a config document and exit
    CheckConfig {
        /// Validation config document
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .init();

    let code = match &cli.command {
        Commands::Run(args) => match run_validation(args).await {
            Ok(report) => {
                output::print_report(&report, cli.format);
                if report.ok() {
                    0
                } else {
                    1
                }
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                2
            }
        },
        Commands::CheckConfig { config } => match check_config(config) {
            Ok(parsed) => {
                println!(
                    "OK: {} section(s), {} field(s)",
                    parsed.sections().len(),
                    parsed.sections().iter().map(|s| s.keys.len()).sum::<usize>()
                );
                0
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                2
            }
        },
    };

    std::process::exit(code);
}
