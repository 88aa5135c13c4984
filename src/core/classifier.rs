//! Input classification
//!
//! Decides how a path given on the command line is turned into records:
//! a FASTA file with one record, a FASTA file with several, or a
//! directory whose single-record FASTA files are typed one by one.

use crate::bio::fasta::{count_records_up_to, has_fasta_extension};
use crate::SeqtyperError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
    /// A FASTA file holding exactly one record
    SingleRecordFile(PathBuf),
    /// A FASTA file holding two or more records
    MultiRecordFile(PathBuf),
    /// A directory of FASTA files, non-recursive
    DirectoryOfFiles {
        dir: PathBuf,
        /// Single-record files, in name order
        files: Vec<PathBuf>,
        /// FASTA-named files left out of the batch (multi-record or empty)
        skipped: Vec<PathBuf>,
    },
}

impl DispatchMode {
    pub fn path(&self) -> &Path {
        match self {
            DispatchMode::SingleRecordFile(path) | DispatchMode::MultiRecordFile(path) => path,
            DispatchMode::DirectoryOfFiles { dir, .. } => dir,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispatchMode::SingleRecordFile(_) => "single-record file",
            DispatchMode::MultiRecordFile(_) => "multi-record file",
            DispatchMode::DirectoryOfFiles { .. } => "directory",
        }
    }
}

/// Record count class of a FASTA file; counting stops at two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordCount {
    Empty,
    One,
    Many,
}

fn record_count(path: &Path) -> Result<RecordCount, SeqtyperError> {
    Ok(match count_records_up_to(path, 2)? {
        0 => RecordCount::Empty,
        1 => RecordCount::One,
        _ => RecordCount::Many,
    })
}

/// Classify one input path
pub fn classify<P: AsRef<Path>>(path: P) -> Result<DispatchMode, SeqtyperError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SeqtyperError::InvalidInput(format!(
            "{} does not exist",
            path.display()
        )));
    }

    if path.is_dir() {
        return classify_directory(path);
    }

    if !has_fasta_extension(path) {
        return Err(SeqtyperError::InvalidInput(format!(
            "{} is not a FASTA file",
            path.display()
        )));
    }

    match record_count(path)? {
        RecordCount::Empty => Err(SeqtyperError::InvalidInput(format!(
            "{} contains no FASTA records",
            path.display()
        ))),
        RecordCount::One => Ok(DispatchMode::SingleRecordFile(path.to_path_buf())),
        RecordCount::Many => Ok(DispatchMode::MultiRecordFile(path.to_path_buf())),
    }
}

fn classify_directory(dir: &Path) -> Result<DispatchMode, SeqtyperError> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_fasta_extension(&path) {
            candidates.push(path);
        }
    }

    if candidates.is_empty() {
        return Err(SeqtyperError::InvalidInput(format!(
            "{} does not have any FASTA file",
            dir.display()
        )));
    }

    // read_dir order is platform dependent
    candidates.sort();

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for path in candidates {
        match record_count(&path)? {
            RecordCount::One => files.push(path),
            count => {
                debug!("Skipping {} ({:?} records)", path.display(), count);
                skipped.push(path);
            }
        }
    }

    Ok(DispatchMode::DirectoryOfFiles {
        dir: dir.to_path_buf(),
        files,
        skipped,
    })
}

/// Classify every input up front, failing on the first bad path
pub fn classify_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DispatchMode>, SeqtyperError> {
    paths.iter().map(|path| classify(path)).collect()
}
