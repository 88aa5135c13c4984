use crate::core::config::{resolve_config, RunConfigurationBuilder, TyperFlags};
use crate::core::species::Catalog;
use crate::core::BatchRunner;
use crate::report::text::generate_text_summary;
use crate::tools::MlstTyper;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// FASTA file(s) or directories of FASTA files to type
    #[arg(short, long, value_name = "PATH", required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// MLST database code of the species (see `seqtyper list-species`)
    #[arg(short, long, value_name = "CODE")]
    pub species: String,

    /// Directory results.csv is written to (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Path to the blastn executable the typer should use
    #[arg(long, value_name = "FILE")]
    pub method_path: Option<PathBuf>,

    /// MLST database directory (default: ${SEQTYPER_HOME}/mlst_db)
    #[arg(long, value_name = "DIR")]
    pub database: Option<PathBuf>,

    /// Scratch directory shared by typer invocations (default: ${SEQTYPER_HOME}/tmp)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Typer executable, a path or a name on PATH
    #[arg(long, value_name = "PROGRAM")]
    pub typer: Option<String>,

    /// Minimum depth of coverage passed to the typer
    #[arg(short, long)]
    pub depth: Option<f64>,

    /// Ask the typer for its alignment matrix
    #[arg(long)]
    pub matrix: bool,

    /// Ask the typer for extended output files
    #[arg(short = 'x', long)]
    pub extended_output: bool,

    /// Let the typer log (it runs with -q otherwise)
    #[arg(long)]
    pub typer_verbose: bool,

    /// Kill a typer invocation after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Keep each invocation's files under <outdir>/typer_output
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Configuration file (default: ${SEQTYPER_HOME}/config.toml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    // Checked before any file is read
    let catalog = Catalog::builtin();
    let organism = catalog.validate(&args.species)?;

    let config = resolve_config(args.config.as_deref())?;
    let mut builder = RunConfigurationBuilder::from_config(&config)
        .inputs(args.input)
        .species(args.species);

    let mut flags = TyperFlags::from(&config.typer);
    if let Some(depth) = args.depth {
        flags.depth = depth;
    }
    flags.matrix |= args.matrix;
    flags.extended_output |= args.extended_output;
    if args.typer_verbose {
        flags.quiet = false;
    }
    builder = builder.flags(flags);

    if let Some(outdir) = args.outdir {
        builder = builder.outdir(outdir);
    }
    if let Some(method_path) = args.method_path {
        builder = builder.method_path(method_path);
    }
    if let Some(database) = args.database {
        builder = builder.database(database);
    }
    if let Some(scratch_dir) = args.scratch_dir {
        builder = builder.scratch_dir(scratch_dir);
    }
    if let Some(seconds) = args.timeout {
        builder = builder.timeout(Some(Duration::from_secs(seconds)));
    }
    if args.keep_artifacts {
        builder = builder.keep_artifacts(true);
    }

    let run_config = builder.build(&catalog)?;
    info!("Typing {} with the {} scheme", organism, run_config.species);

    let program = args.typer.unwrap_or(config.typer.program);
    let typer = MlstTyper::locate(&program);
    let summary = BatchRunner::new(&run_config, typer)
        .with_silent(args.quiet)
        .run()?;

    print!("{}", generate_text_summary(&summary, &run_config.outdir)?);
    Ok(())
}
