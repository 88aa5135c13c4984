use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the home directory to avoid repeated environment lookups
static SEQTYPER_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Name of the structured result file the typer writes into its output directory
pub const TYPER_ARTIFACT: &str = "data.json";

/// Name of the aggregated report inside the output directory
pub const REPORT_FILE: &str = "results.csv";

/// Get the seqtyper home directory
/// Checks SEQTYPER_HOME environment variable, falls back to ${HOME}/.seqtyper
pub fn seqtyper_home() -> PathBuf {
    SEQTYPER_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("SEQTYPER_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".seqtyper")
            }
        })
        .clone()
}

/// Get the MLST database directory
/// Checks SEQTYPER_DB_DIR environment variable, falls back to SEQTYPER_HOME/mlst_db
pub fn default_database_dir() -> PathBuf {
    std::env::var("SEQTYPER_DB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| seqtyper_home().join("mlst_db"))
}

/// Get the scratch directory shared by all typer invocations of a run
/// Checks SEQTYPER_TMP_DIR environment variable, falls back to SEQTYPER_HOME/tmp
pub fn default_scratch_dir() -> PathBuf {
    std::env::var("SEQTYPER_TMP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| seqtyper_home().join("tmp"))
}

/// Location of the optional configuration file
pub fn default_config_path() -> PathBuf {
    seqtyper_home().join("config.toml")
}
