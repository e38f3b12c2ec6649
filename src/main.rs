use clap::Parser;
use colored::*;
use std::process;
use tracealign::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // TRACEALIGN_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let log_level = std::env::var("TRACEALIGN_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

/// Exit status for the first recognised error in the context chain
fn exit_code(error: &anyhow::Error) -> i32 {
    use tracealign::TracealignError;

    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<TracealignError>() {
            return match err {
                TracealignError::Config(_) => 2,
                TracealignError::Io(_) => 3,
                TracealignError::Parse(_) | TracealignError::Decode(_) => 4,
                TracealignError::DatabaseBuildFailure(_) => 5,
                _ => 1,
            };
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return 3;
        }
    }
    1
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => tracealign::cli::commands::run::run(args),
        Commands::Convert(args) => tracealign::cli::commands::convert::run(args),
        Commands::Parse(args) => tracealign::cli::commands::parse::run(args),
        Commands::Config(args) => tracealign::cli::commands::config::run(args),
    }
}
