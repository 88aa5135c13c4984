pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "seqtyper",
    version,
    about = "Batch MLST typing of FASTA genomes",
    long_about = "Seqtyper runs an external MLST typer over every record of a FASTA file, \
                  or every single-record FASTA file of a directory, and collects the \
                  sequence types into one results.csv."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Type every record of the given inputs and write results.csv
    Run(commands::run::RunArgs),

    /// List the species and database codes that can be typed
    ListSpecies(commands::list_species::ListSpeciesArgs),
}

impl Cli {
    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
