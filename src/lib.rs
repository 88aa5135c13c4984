pub mod bio;
pub mod cli;
pub mod core;
pub mod report;
pub mod tools;

pub use crate::core::orchestrator::{BatchRunner, BatchSummary};
pub use crate::core::species::Catalog;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeqtyperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not a valid species option")]
    InvalidSpecies(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Typer invocation failed: {0}")]
    TyperInvocation(String),

    #[error("Typer timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Malformed typer result: {0}")]
    MalformedResult(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SeqtyperError {
    /// Errors scoped to a single record. The batch records a failure row
    /// for these and moves on; everything else aborts the run.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            SeqtyperError::TyperInvocation(_)
                | SeqtyperError::Timeout { .. }
                | SeqtyperError::MalformedResult(_)
        )
    }
}

impl From<serde_json::Error> for SeqtyperError {
    fn from(err: serde_json::Error) -> Self {
        SeqtyperError::MalformedResult(err.to_string())
    }
}

impl From<csv::Error> for SeqtyperError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(e) => SeqtyperError::Io(e),
            other => SeqtyperError::Parse(format!("{:?}", other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeqtyperError>;
