//! Trait definitions for sequence typers
//!
//! The batch orchestrator only talks to [`Typer`], so the real MLST
//! program and test doubles are interchangeable.

use crate::core::config::{RunConfiguration, TyperFlags};
use crate::SeqtyperError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything one typer invocation needs
#[derive(Debug, Clone)]
pub struct TypingRequest<'a> {
    /// FASTA file holding the single record to type
    pub fasta: &'a Path,
    pub species: &'a str,
    pub database: &'a Path,
    /// Directory the typer works and writes its result in
    pub output_dir: &'a Path,
    pub method_path: Option<&'a Path>,
    pub flags: &'a TyperFlags,
    pub timeout: Option<Duration>,
}

impl<'a> TypingRequest<'a> {
    pub fn new(fasta: &'a Path, config: &'a RunConfiguration, output_dir: &'a Path) -> Self {
        Self {
            fasta,
            species: &config.species,
            database: &config.database,
            output_dir,
            method_path: config.method_path.as_deref(),
            flags: &config.flags,
            timeout: config.timeout,
        }
    }
}

/// Common interface for external sequence typers
pub trait Typer {
    /// Run the typer and return the path of its structured result.
    ///
    /// Errors are `TyperInvocation` when the program could not run to
    /// completion and `Timeout` when it was killed for running too long.
    /// A returned path is not guaranteed to exist.
    fn type_sequence(&self, request: &TypingRequest<'_>) -> Result<PathBuf, SeqtyperError>;

    /// Get the name of this typer
    fn name(&self) -> &str;

    /// Check if the typer can be started at all
    fn is_available(&self) -> bool {
        true
    }
}
