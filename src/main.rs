use clap::Parser;
use colored::*;
use seqtyper::cli::{Cli, Commands};
use seqtyper::SeqtyperError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // SEQTYPER_LOG wins over RUST_LOG, which wins over -v
    let filter = std::env::var("SEQTYPER_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<SeqtyperError>() {
            Some(SeqtyperError::InvalidInput(_))
            | Some(SeqtyperError::InvalidSpecies(_))
            | Some(SeqtyperError::Configuration(_)) => 2,
            Some(SeqtyperError::Io(_)) | Some(SeqtyperError::Workspace(_)) => 3,
            Some(SeqtyperError::Parse(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => seqtyper::cli::commands::run::run(args),
        Commands::ListSpecies(args) => seqtyper::cli::commands::list_species::run(args),
    }
}
