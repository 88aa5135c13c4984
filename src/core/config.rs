//! Configuration for seqtyper
//!
//! Two layers: [`Config`] is the optional TOML file, [`RunConfiguration`]
//! is the validated, immutable bundle a batch runs with. Command-line
//! values override file values, which override built-in defaults.

use crate::core::paths;
use crate::core::species::Catalog;
use crate::SeqtyperError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub typer: TyperConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TyperConfig {
    /// Typer executable, a path or a name looked up on PATH
    #[serde(default = "default_program")]
    pub program: String,
    /// Override for the alignment program the typer calls (blastn)
    #[serde(default)]
    pub method_path: Option<PathBuf>,
    #[serde(default = "default_depth")]
    pub depth: f64,
    #[serde(default)]
    pub matrix: bool,
    #[serde(default)]
    pub extended_output: bool,
    #[serde(default = "default_quiet")]
    pub quiet: bool,
    /// Per-invocation limit; unset waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Move each invocation's files to the output directory instead of deleting them
    #[serde(default)]
    pub keep_artifacts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PathsConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_program() -> String { "mlst.py".to_string() }
fn default_depth() -> f64 { 5.0 }
fn default_quiet() -> bool { true }

impl Default for TyperConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            method_path: None,
            depth: default_depth(),
            matrix: false,
            extended_output: false,
            quiet: default_quiet(),
            timeout_secs: None,
            keep_artifacts: false,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SeqtyperError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| SeqtyperError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), SeqtyperError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| SeqtyperError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Load an explicit config file, or the default one if it exists
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, SeqtyperError> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let default_path = paths::default_config_path();
            if default_path.is_file() {
                load_config(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Switches forwarded to the typer on every invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TyperFlags {
    /// Minimum coverage depth
    pub depth: f64,
    /// Emit the alignment matrix
    pub matrix: bool,
    pub extended_output: bool,
    pub quiet: bool,
}

impl Default for TyperFlags {
    fn default() -> Self {
        TyperFlags::from(&TyperConfig::default())
    }
}

impl From<&TyperConfig> for TyperFlags {
    fn from(config: &TyperConfig) -> Self {
        Self {
            depth: config.depth,
            matrix: config.matrix,
            extended_output: config.extended_output,
            quiet: config.quiet,
        }
    }
}

/// Everything a batch needs, validated once before any record is touched
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub inputs: Vec<PathBuf>,
    pub species: String,
    pub database: PathBuf,
    pub scratch_dir: PathBuf,
    pub method_path: Option<PathBuf>,
    pub outdir: PathBuf,
    pub flags: TyperFlags,
    pub timeout: Option<Duration>,
    pub keep_artifacts: bool,
}

impl RunConfiguration {
    pub fn builder() -> RunConfigurationBuilder {
        RunConfigurationBuilder::default()
    }

    pub fn report_path(&self) -> PathBuf {
        self.outdir.join(paths::REPORT_FILE)
    }

    /// Where kept typer output goes when `keep_artifacts` is set
    pub fn artifacts_dir(&self) -> PathBuf {
        self.outdir.join("typer_output")
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunConfigurationBuilder {
    inputs: Vec<PathBuf>,
    species: Option<String>,
    database: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
    method_path: Option<PathBuf>,
    outdir: Option<PathBuf>,
    flags: TyperFlags,
    timeout: Option<Duration>,
    keep_artifacts: bool,
}

impl RunConfigurationBuilder {
    /// Seed the builder with values from a config file
    pub fn from_config(config: &Config) -> Self {
        Self {
            database: config.paths.database.clone(),
            scratch_dir: config.paths.scratch_dir.clone(),
            method_path: config.typer.method_path.clone(),
            flags: TyperFlags::from(&config.typer),
            timeout: config.typer.timeout_secs.map(Duration::from_secs),
            keep_artifacts: config.typer.keep_artifacts,
            ..Self::default()
        }
    }

    pub fn input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn species<S: Into<String>>(mut self, species: S) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn database<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database = Some(path.into());
        self
    }

    pub fn scratch_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.scratch_dir = Some(path.into());
        self
    }

    pub fn method_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.method_path = Some(path.into());
        self
    }

    pub fn outdir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.outdir = Some(path.into());
        self
    }

    pub fn flags(mut self, flags: TyperFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// The species code is checked first so an invalid code fails before
    /// the filesystem is touched. Input paths themselves are checked by
    /// the classifier.
    pub fn build(self, catalog: &Catalog) -> Result<RunConfiguration, SeqtyperError> {
        let species = self
            .species
            .ok_or_else(|| SeqtyperError::Configuration("a species code is required".to_string()))?;
        catalog.validate(&species)?;
        let species = species.trim().to_string();

        if self.inputs.is_empty() {
            return Err(SeqtyperError::InvalidInput("no input paths given".to_string()));
        }

        let outdir = match self.outdir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        if !outdir.exists() {
            return Err(SeqtyperError::InvalidInput(format!(
                "{} does not exist",
                outdir.display()
            )));
        }
        if !outdir.is_dir() {
            return Err(SeqtyperError::InvalidInput(format!(
                "{} is not a directory",
                outdir.display()
            )));
        }

        if let Some(method_path) = &self.method_path {
            if !method_path.exists() {
                return Err(SeqtyperError::InvalidInput(format!(
                    "{} does not exist",
                    method_path.display()
                )));
            }
            if !method_path.is_file() {
                return Err(SeqtyperError::InvalidInput(format!(
                    "{} is not a file",
                    method_path.display()
                )));
            }
        }

        let database = self.database.unwrap_or_else(paths::default_database_dir);
        if !database.is_dir() {
            return Err(SeqtyperError::Configuration(format!(
                "MLST database directory {} does not exist",
                database.display()
            )));
        }

        if !(self.flags.depth.is_finite() && self.flags.depth >= 0.0) {
            return Err(SeqtyperError::Configuration(format!(
                "depth must be a non-negative number, got {}",
                self.flags.depth
            )));
        }

        let scratch_dir = self.scratch_dir.unwrap_or_else(paths::default_scratch_dir);
        ensure_scratch_isolated(
            &scratch_dir,
            self.inputs
                .iter()
                .map(PathBuf::as_path)
                .chain([outdir.as_path(), database.as_path()]),
        )?;

        Ok(RunConfiguration {
            inputs: self.inputs,
            species,
            database,
            scratch_dir,
            method_path: self.method_path,
            outdir,
            flags: self.flags,
            timeout: self.timeout,
            keep_artifacts: self.keep_artifacts,
        })
    }
}

/// The scratch directory is purged on open, so it must not be, or
/// contain, anything the run reads or writes.
fn ensure_scratch_isolated<'p>(
    scratch_dir: &Path,
    protected: impl IntoIterator<Item = &'p Path>,
) -> Result<(), SeqtyperError> {
    // A directory that does not exist yet cannot hold anything
    let Ok(scratch) = scratch_dir.canonicalize() else {
        return Ok(());
    };
    for path in protected {
        if let Ok(canonical) = path.canonicalize() {
            if canonical.starts_with(&scratch) {
                return Err(SeqtyperError::Configuration(format!(
                    "scratch directory {} is emptied before every record and would remove {}",
                    scratch_dir.display(),
                    path.display()
                )));
            }
        }
    }
    Ok(())
}
