//! Batch report output
//!
//! `results.csv` is written through as records finish: the header goes
//! out when the report is opened and every row is flushed on append, so
//! an interrupted batch still leaves the rows it completed.

pub mod text;

use crate::core::extractor::TypingResult;
use crate::SeqtyperError;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column names of the report
pub const HEADER: [&str; 2] = ["id", "sequence_type"];

pub struct ReportWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl ReportWriter {
    /// Create or truncate the report and write the header
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SeqtyperError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    /// Append one row and flush it to disk
    pub fn append(&mut self, result: &TypingResult) -> Result<(), SeqtyperError> {
        self.writer
            .write_record([result.id.as_str(), result.sequence_type()])?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Finish the report, returning its path
    pub fn close(mut self) -> Result<PathBuf, SeqtyperError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_header_only_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let report = ReportWriter::open(&path).unwrap();
        assert_eq!(report.rows(), 0);
        let written = report.close().unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,sequence_type\n");
    }

    #[test]
    fn test_rows_visible_before_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut report = ReportWriter::open(&path).unwrap();

        report.append(&TypingResult::typed("seqA", "5")).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,sequence_type\nseqA,5\n"
        );

        report.append(&TypingResult::failed("seqB", "timeout")).unwrap();
        assert_eq!(report.rows(), 2);
        report.close().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,sequence_type\nseqA,5\nseqB,NA\n"
        );
    }

    #[test]
    fn test_open_truncates_previous_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "id,sequence_type\nold,1\nolder,2\n").unwrap();

        let mut report = ReportWriter::open(&path).unwrap();
        report.append(&TypingResult::typed("new", "3")).unwrap();
        report.close().unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,sequence_type\nnew,3\n"
        );
    }

    #[test]
    fn test_ids_with_commas_are_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut report = ReportWriter::open(&path).unwrap();
        report.append(&TypingResult::typed("contig,1", "5")).unwrap();
        report.close().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][0], "contig,1");
        assert_eq!(&rows[0][1], "5");
    }
}
