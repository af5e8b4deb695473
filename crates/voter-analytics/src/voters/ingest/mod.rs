mod normalizer;
mod parser;

use crate::voters::store::{StoreError, VoterStore};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use parser::ColumnLayout;

/// A single row that could not be normalized. The batch continues past it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowParseError {
    #[error("line {line}: voter_score '{value}' is not a non-negative integer")]
    InvalidScore { line: u64, value: String },
    #[error("line {line}: missing column '{column}'")]
    MissingColumn { line: u64, column: &'static str },
    #[error("line {line}: malformed row ({reason})")]
    Malformed { line: u64, reason: String },
}

impl RowParseError {
    pub fn line(&self) -> u64 {
        match self {
            Self::InvalidScore { line, .. }
            | Self::MissingColumn { line, .. }
            | Self::Malformed { line, .. } => *line,
        }
    }
}

/// Source-level failure. Row-level problems never surface here.
#[derive(Debug)]
pub enum IngestError {
    SourceNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    Io(std::io::Error),
    Csv(csv::Error),
    Store(StoreError),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::SourceNotFound { path, source } => {
                write!(f, "voter file {} is not readable: {}", path.display(), source)
            }
            IngestError::Io(err) => write!(f, "failed to read voter file: {}", err),
            IngestError::Csv(err) => write!(f, "invalid voter CSV data: {}", err),
            IngestError::Store(err) => write!(f, "could not store voter records: {}", err),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::SourceNotFound { source, .. } => Some(source),
            IngestError::Io(err) => Some(err),
            IngestError::Csv(err) => Some(err),
            IngestError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub loaded: usize,
    pub skipped: usize,
    pub errors: Vec<RowParseError>,
}

impl IngestSummary {
    pub fn to_view(&self) -> IngestSummaryView {
        IngestSummaryView {
            loaded: self.loaded,
            skipped: self.skipped,
            errors: self.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummaryView {
    pub loaded: usize,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Full-replace loader for voter exports.
///
/// Each run deletes every stored voter and inserts the rows of the new file,
/// so repeated runs over the same file converge on the same record set. Runs
/// must not overlap; callers serialize them.
pub struct VoterImporter;

impl VoterImporter {
    pub fn from_path<S, P>(store: &S, path: P) -> Result<IngestSummary, IngestError>
    where
        S: VoterStore + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| IngestError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(store, file)
    }

    pub fn from_reader<S, R>(store: &S, reader: R) -> Result<IngestSummary, IngestError>
    where
        S: VoterStore + ?Sized,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        // The header must be readable before anything is deleted.
        let layout = ColumnLayout::resolve(csv_reader.headers()?);
        debug!(legacy = layout.is_legacy(), "resolved voter column layout");

        let removed = store.delete_all()?;
        debug!(removed, "cleared existing voter records");

        let mut summary = IngestSummary::default();
        for (index, result) in csv_reader.records().enumerate() {
            let fallback_line = index as u64 + 2;
            let parsed = match result {
                Ok(record) => {
                    let line = record
                        .position()
                        .map(csv::Position::line)
                        .unwrap_or(fallback_line);
                    parser::parse_row(&layout, &record, line)
                }
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => Err(RowParseError::Malformed {
                    line: err
                        .position()
                        .map(csv::Position::line)
                        .unwrap_or(fallback_line),
                    reason: err.to_string(),
                }),
            };

            match parsed {
                Ok(voter) => {
                    store.insert(voter)?;
                    summary.loaded += 1;
                }
                Err(err) => {
                    warn!(line = err.line(), error = %err, "skipping voter row");
                    summary.skipped += 1;
                    summary.errors.push(err);
                }
            }
        }

        info!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            "voter ingestion complete"
        );
        Ok(summary)
    }
}
