//! Line-oriented result ingestion.
//!
//! Each non-blank, non-comment line is one record:
//!
//! ```text
//! swimmerId,name,birthYear,sex,distance,stroke,course,date,timeSeconds
//! ```
//!
//! Fields are split on every comma; quote characters have no special meaning
//! and are kept as entered. A bad line never aborts a load: it is skipped and
//! recorded as a [`LineDiagnostic`], and the remaining lines are still read.

/// Directory ("database") loading.
pub mod directory;

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::model::{FieldError, Interner, ParsedRecord, RaceResult};

/// Leading character of an ignored line. Must be the first byte of the line.
pub const COMMENT_MARKER: char = '#';

/// Load-level failure. Nothing from the failed load is kept.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// No `.csv` file in the directory could be read.
    #[error("no readable .csv input in {}", .dir.display())]
    NoInput {
        /// Directory that was scanned.
        dir: PathBuf,
    },
    /// A file or directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Why a line was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineError {
    /// A field was missing or did not parse.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// The line could not be split into fields.
    #[error("unreadable record: {0}")]
    Csv(String),
    /// The line's bytes are not UTF-8.
    #[error("line is not valid UTF-8 (first bad byte at column {column})")]
    Encoding {
        /// One-based byte column of the first invalid byte.
        column: usize,
    },
}

/// A skipped line and the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDiagnostic {
    /// File the line came from, when read from disk.
    pub file: Option<PathBuf>,
    /// One-based line number.
    pub line: usize,
    /// Why it was skipped.
    pub reason: LineError,
}

/// Outcome of one load: parsed results in input order plus skipped lines.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Accepted results, in input order.
    pub results: Vec<RaceResult>,
    /// Skipped lines, in input order.
    pub diagnostics: Vec<LineDiagnostic>,
    /// Files read, in read order.
    pub files: Vec<PathBuf>,
}

impl IngestReport {
    /// Number of lines skipped as malformed.
    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Accumulates results across one or more inputs, sharing swimmer and event
/// values between them.
#[derive(Debug, Default)]
pub struct Ingestor {
    interner: Interner,
    report: IngestReport,
}

impl Ingestor {
    /// Empty ingestor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `lines`, returning how many results were accepted.
    pub fn ingest_lines<I, S>(&mut self, file: Option<&Path>, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.report.results.len();
        for (idx, line) in lines.into_iter().enumerate() {
            self.ingest_line(file, idx + 1, Ok(line.as_ref()));
        }
        self.report.results.len() - before
    }

    /// Parses raw bytes split on `\n`. Each line is decoded on its own, so a
    /// line that is not UTF-8 is skipped without losing its neighbours.
    pub fn ingest_bytes(&mut self, file: Option<&Path>, bytes: &[u8]) -> usize {
        let before = self.report.results.len();
        for (idx, raw) in byte_lines(bytes).enumerate() {
            let line = std::str::from_utf8(raw).map_err(|e| LineError::Encoding {
                column: e.valid_up_to() + 1,
            });
            self.ingest_line(file, idx + 1, line);
        }
        self.report.results.len() - before
    }

    /// Reads and parses one file.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize, IngestError> {
        let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let skipped_before = self.report.skipped();
        let loaded = self.ingest_bytes(Some(path), &bytes);
        self.report.files.push(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            loaded,
            skipped = self.report.skipped() - skipped_before,
            "loaded result file"
        );
        Ok(loaded)
    }

    /// Ends the load and hands back everything gathered.
    pub fn finish(self) -> IngestReport {
        self.report
    }

    fn ingest_line(&mut self, file: Option<&Path>, line_no: usize, line: Result<&str, LineError>) {
        let parsed = line.and_then(|line| {
            if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
                return Ok(None);
            }
            parse_line(line).map(Some)
        });

        match parsed {
            Ok(None) => {}
            Ok(Some(record)) => self.report.results.push(self.interner.result(record)),
            Err(reason) => {
                tracing::warn!(
                    file = ?file,
                    line = line_no,
                    reason = %reason,
                    "skipping malformed result line"
                );
                self.report.diagnostics.push(LineDiagnostic {
                    file: file.map(Path::to_path_buf),
                    line: line_no,
                    reason,
                });
            }
        }
    }
}

/// Parses in-memory lines.
pub fn parse_lines<I, S>(lines: I) -> IngestReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ingestor = Ingestor::new();
    ingestor.ingest_lines(None, lines);
    ingestor.finish()
}

/// Parses a block of text, one record per line.
pub fn parse_str(text: &str) -> IngestReport {
    parse_lines(text.lines())
}

/// Reads and parses a single file.
pub fn ingest_file(path: impl AsRef<Path>) -> Result<IngestReport, IngestError> {
    let mut ingestor = Ingestor::new();
    ingestor.ingest_file(path.as_ref())?;
    Ok(ingestor.finish())
}

fn parse_line(line: &str) -> Result<ParsedRecord, LineError> {
    let record = split_record(line).map_err(|e| LineError::Csv(e.to_string()))?;
    let fields: Vec<&str> = record.iter().collect();
    Ok(ParsedRecord::from_fields(fields.as_slice())?)
}

fn split_record(line: &str) -> Result<StringRecord, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

/// Splits like [`str::lines`]: on `\n`, dropping one trailing `\r` per line
/// and no empty line after a final newline.
fn byte_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}
