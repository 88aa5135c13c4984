//! Batch orchestration
//!
//! Every input is classified, and every record it will dispatch is
//! checked for a readable header, before anything is written. The runner then
//! walks the records in discovery order, one at a time, through
//! stage -> type -> extract -> append -> reset. Records share a single
//! scratch workspace, so there is no overlap between iterations.

use crate::bio::fasta::{check_records, read_first, FastaReader};
use crate::bio::sequence::Sequence;
use crate::core::classifier::{classify_all, DispatchMode};
use crate::core::config::RunConfiguration;
use crate::core::extractor::{extract, TypingResult};
use crate::core::workspace::ScratchWorkspace;
use crate::report::ReportWriter;
use crate::tools::traits::{Typer, TypingRequest};
use crate::SeqtyperError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counts for a finished batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Rows written to the report
    pub processed: usize,
    pub typed: usize,
    pub failed: usize,
    /// Directory entries left out because they were not single-record files
    pub skipped: usize,
    pub report_path: PathBuf,
}

/// One unit of work: either a file handed to the typer as is, or a record
/// that has to be staged into the workspace first.
#[derive(Debug)]
pub enum BatchItem {
    File { id: String, path: PathBuf },
    Record(Sequence),
}

impl BatchItem {
    pub fn id(&self) -> &str {
        match self {
            BatchItem::File { id, .. } => id,
            BatchItem::Record(record) => &record.id,
        }
    }
}

pub struct BatchRunner<'a, T: Typer> {
    config: &'a RunConfiguration,
    typer: T,
    silent: bool,
}

impl<'a, T: Typer> BatchRunner<'a, T> {
    pub fn new(config: &'a RunConfiguration, typer: T) -> Self {
        Self {
            config,
            typer,
            silent: false,
        }
    }

    /// Hide the progress bar
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn typer(&self) -> &T {
        &self.typer
    }

    /// Run the whole batch and close the report.
    ///
    /// Per-record failures become `NA` rows. Any other error aborts the
    /// run; rows appended before the abort stay on disk.
    pub fn run(&self) -> Result<BatchSummary, SeqtyperError> {
        let modes = classify_all(&self.config.inputs)?;
        for mode in &modes {
            debug!("{} classified as {}", mode.path().display(), mode.label());
        }

        // A record that cannot be read must not end the batch halfway
        let total = modes.iter().map(expected_records).sum::<Result<usize, _>>()?;

        if !self.typer.is_available() {
            warn!(
                "Typer {} is not available; every record will be reported as failed",
                self.typer.name()
            );
        }

        let workspace = ScratchWorkspace::open(&self.config.scratch_dir)?;
        let mut report = ReportWriter::open(self.config.report_path())?;
        info!(
            "Typing {} input(s) for species {} into {}",
            modes.len(),
            self.config.species,
            report.path().display()
        );

        let progress = self.progress_bar(total as u64);

        let mut summary = BatchSummary {
            processed: 0,
            typed: 0,
            failed: 0,
            skipped: 0,
            report_path: report.path().to_path_buf(),
        };

        for mode in &modes {
            match mode {
                DispatchMode::SingleRecordFile(path) => {
                    let item = file_item(path)?;
                    self.dispatch(&workspace, &mut report, &mut summary, &progress, item)?;
                }
                DispatchMode::MultiRecordFile(path) => {
                    for record in FastaReader::from_path(path)? {
                        let item = BatchItem::Record(record?);
                        self.dispatch(&workspace, &mut report, &mut summary, &progress, item)?;
                    }
                }
                DispatchMode::DirectoryOfFiles { files, skipped, .. } => {
                    summary.skipped += skipped.len();
                    for path in files {
                        let item = file_item(path)?;
                        self.dispatch(&workspace, &mut report, &mut summary, &progress, item)?;
                    }
                }
            }
        }

        progress.finish_and_clear();
        summary.report_path = report.close()?;
        info!(
            "Batch finished: {} typed, {} failed, {} skipped",
            summary.typed, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    fn dispatch(
        &self,
        workspace: &ScratchWorkspace,
        report: &mut ReportWriter,
        summary: &mut BatchSummary,
        progress: &ProgressBar,
        item: BatchItem,
    ) -> Result<(), SeqtyperError> {
        progress.set_message(item.id().to_string());
        let result = self.process_one(workspace, summary.processed, &item)?;
        report.append(&result)?;

        summary.processed += 1;
        if result.is_typed() {
            summary.typed += 1;
        } else {
            summary.failed += 1;
        }
        progress.inc(1);
        Ok(())
    }

    /// Type one item in the workspace and turn the outcome into a row.
    ///
    /// The workspace is empty when this returns, whatever happened.
    pub fn process_one(
        &self,
        workspace: &ScratchWorkspace,
        index: usize,
        item: &BatchItem,
    ) -> Result<TypingResult, SeqtyperError> {
        let lease = workspace.acquire()?;
        let fasta = match item {
            BatchItem::File { path, .. } => path.clone(),
            BatchItem::Record(record) => lease.stage(record)?,
        };

        let request = TypingRequest::new(&fasta, self.config, workspace.root());
        let outcome = self
            .typer
            .type_sequence(&request)
            .and_then(|artifact| extract(item.id(), &artifact));

        let result = match outcome {
            Ok(result) => {
                debug!("{} -> ST {}", result.id, result.sequence_type());
                result
            }
            Err(e) if e.is_per_record() => {
                warn!("Could not type {}: {}", item.id(), e);
                TypingResult::failed(item.id(), e.to_string())
            }
            Err(e) => return Err(e),
        };

        if self.config.keep_artifacts {
            let dest = self
                .config
                .artifacts_dir()
                .join(format!("{}_{}", index, safe_dir_name(item.id())));
            workspace.preserve_into(&dest)?;
        }

        lease.release()?;
        Ok(result)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if self.silent {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓▒░"));
        }
        pb
    }
}

fn file_item(path: &Path) -> Result<BatchItem, SeqtyperError> {
    let record = read_first(path)?;
    Ok(BatchItem::File {
        id: record.id,
        path: path.to_path_buf(),
    })
}

/// Read every header of a file that will be dispatched
fn checked_records(path: &Path) -> Result<usize, SeqtyperError> {
    check_records(path).map_err(|e| match e {
        SeqtyperError::Parse(msg) => {
            SeqtyperError::InvalidInput(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn expected_records(mode: &DispatchMode) -> Result<usize, SeqtyperError> {
    match mode {
        DispatchMode::SingleRecordFile(path) | DispatchMode::MultiRecordFile(path) => {
            checked_records(path)
        }
        DispatchMode::DirectoryOfFiles { files, .. } => files
            .iter()
            .map(|path| checked_records(path))
            .sum::<Result<usize, _>>(),
    }
}

/// Record ids may contain path separators
fn safe_dir_name(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
