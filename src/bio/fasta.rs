use crate::bio::sequence::Sequence;
use crate::SeqtyperError;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{space0, space1},
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Extensions recognised as FASTA, compared case-insensitively.
pub const FASTA_EXTENSIONS: [&str; 6] = ["fasta", "fna", "ffn", "faa", "frn", "fa"];

/// Residues per line when writing records.
const LINE_WIDTH: usize = 80;

/// Check whether a path carries one of the FASTA extensions
pub fn has_fasta_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FASTA_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Parse a FASTA header line (line ending already stripped).
/// Blanks between `>` and the identifier are skipped.
fn parse_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = tag(">")(input)?;
    let (input, _) = space0(input)?;
    let (input, id) = take_till(|c: char| c == ' ' || c == '\t')(input)?;
    let (input, description) = opt(preceded(space1, rest))(input)?;
    Ok((input, (id, description)))
}

fn header_to_sequence(line: &str) -> Result<Sequence, SeqtyperError> {
    let (_, (id, description)) = parse_header(line)
        .map_err(|e| SeqtyperError::Parse(format!("Failed to parse FASTA header {:?}: {:?}", line, e)))?;

    if id.is_empty() {
        return Err(SeqtyperError::Parse(format!(
            "FASTA header without identifier: {:?}",
            line
        )));
    }

    let mut seq = Sequence::new(id.to_string(), Vec::new());
    if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
        seq = seq.with_description(desc.to_string());
    }
    Ok(seq)
}

/// Streaming FASTA reader yielding one record at a time.
///
/// Only the record being assembled is held in memory, so multi-genome
/// files can be iterated without loading them whole.
pub struct FastaReader<R: BufRead> {
    reader: R,
    pending: Option<Sequence>,
    line: String,
    line_number: usize,
    finished: bool,
}

impl FastaReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SeqtyperError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            line: String::new(),
            line_number: 0,
            finished: false,
        }
    }

    fn next_record(&mut self) -> Result<Option<Sequence>, SeqtyperError> {
        loop {
            self.line.clear();
            let read = self.reader.read_line(&mut self.line)?;
            if read == 0 {
                self.finished = true;
                return Ok(self.pending.take());
            }
            self.line_number += 1;

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.starts_with('>') {
                let next = header_to_sequence(line)?;
                if let Some(done) = self.pending.replace(next) {
                    return Ok(Some(done));
                }
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            match self.pending.as_mut() {
                Some(seq) => seq.sequence.extend(
                    line.bytes()
                        .filter(|c| !c.is_ascii_whitespace())
                        .map(|c| c.to_ascii_uppercase()),
                ),
                None => {
                    return Err(SeqtyperError::Parse(format!(
                        "Sequence data before the first FASTA header (line {})",
                        self.line_number
                    )))
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Sequence, SeqtyperError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(seq)) => Some(Ok(seq)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Read the first record of a FASTA file
pub fn read_first<P: AsRef<Path>>(path: P) -> Result<Sequence, SeqtyperError> {
    let path = path.as_ref();
    FastaReader::from_path(path)?
        .next()
        .unwrap_or_else(|| {
            Err(SeqtyperError::Parse(format!(
                "{} contains no FASTA records",
                path.display()
            )))
        })
}

/// Count header lines, stopping as soon as `limit` is reached.
///
/// This is a single linear scan over the mapped file; records are not
/// parsed.
pub fn count_records_up_to<P: AsRef<Path>>(path: P, limit: usize) -> Result<usize, SeqtyperError> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(count_headers(&mmap[..], limit))
}

/// Scan a whole file and check that every record can be read: each
/// header carries an identifier and no sequence data precedes the first
/// header. Returns the number of records.
pub fn check_records<P: AsRef<Path>>(path: P) -> Result<usize, SeqtyperError> {
    let file = File::open(path.as_ref())?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    let mmap = unsafe { Mmap::map(&file)? };

    let mut count = 0;
    for (index, raw) in mmap.split(|&b| b == b'\n').enumerate() {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');
        if line.starts_with('>') {
            header_to_sequence(line)?;
            count += 1;
        } else if count == 0 && !line.trim().is_empty() {
            return Err(SeqtyperError::Parse(format!(
                "Sequence data before the first FASTA header (line {})",
                index + 1
            )));
        }
    }
    Ok(count)
}

fn count_headers(data: &[u8], limit: usize) -> usize {
    let mut count = 0;
    let mut at_line_start = true;
    for &byte in data {
        if at_line_start && byte == b'>' {
            count += 1;
            if count >= limit {
                break;
            }
        }
        at_line_start = byte == b'\n';
    }
    count
}

/// Write sequences to a FASTA file, replacing any existing content
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> Result<(), SeqtyperError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_fasta_to_writer(&mut writer, sequences)?;
    writer.flush()?;
    Ok(())
}

/// Write sequences to any writer
pub fn write_fasta_to_writer<W: Write>(writer: &mut W, sequences: &[Sequence]) -> Result<(), SeqtyperError> {
    for seq in sequences {
        writeln!(writer, "{}", seq.header())?;
        for chunk in seq.sequence.chunks(LINE_WIDTH) {
            writeln!(writer, "{}", String::from_utf8_lossy(chunk))?;
        }
    }
    Ok(())
}
