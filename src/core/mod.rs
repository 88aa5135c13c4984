pub mod classifier;
pub mod config;
pub mod extractor;
pub mod orchestrator;
pub mod paths;
pub mod species;
pub mod workspace;

pub use config::{Config, RunConfiguration};
pub use orchestrator::{BatchRunner, BatchSummary};
