//! CSV import pipeline building blocks.
//!
//! # Responsibility
//! - Turn uploaded CSV bytes into validated import records.
//! - Resolve record category paths into a parent-ordered category tree.
//!
//! # Invariants
//! - Records entering the resolver have non-blank term, definition and a
//!   parsed, non-empty category path.
//! - Parsing completes for the whole batch before anything is persisted.

use crate::db::DbError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv_reader;
pub mod path;
pub mod resolver;

use path::{CategoryPath, PathError};

/// One validated CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub term: String,
    pub definition: String,
    pub path: CategoryPath,
}

/// Error for every stage of a CSV import.
#[derive(Debug)]
pub enum ImportError {
    /// No file part was supplied.
    NoFile,
    UploadTooLarge {
        size: usize,
        limit: usize,
    },
    /// Declared content type is missing or is not `text/csv`.
    InvalidContentType(Option<String>),
    /// Header row lacks required columns.
    MissingColumns(Vec<&'static str>),
    /// Data row at `line` has a blank `term`, `definition` or `path`.
    MissingFields {
        line: u64,
    },
    InvalidPath {
        line: u64,
        source: PathError,
    },
    /// CSV bytes could not be read (bad quoting, ragged rows, non UTF-8).
    Csv(csv::Error),
    /// Category or word store rejected a read or write.
    Repo(RepoError),
    /// The caller cancelled the import before it committed.
    Cancelled,
}

impl ImportError {
    /// Whether the caller sent an unusable request rather than a bad file.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoFile | Self::UploadTooLarge { .. })
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFile => write!(f, "No file uploaded"),
            Self::UploadTooLarge { size, limit } => write!(
                f,
                "Uploaded file is {size} bytes; the limit is {limit} bytes"
            ),
            Self::InvalidContentType(_) => {
                write!(f, "Invalid file type. Only CSV files are allowed.")
            }
            Self::MissingColumns(columns) => write!(
                f,
                "Missing required columns: {}",
                columns.join(", ")
            ),
            Self::MissingFields { line } => write!(
                f,
                "Missing required fields on line {line}: term, definition, and path are required"
            ),
            Self::InvalidPath { line, source } => {
                write!(f, "Invalid category path on line {line}: {source}")
            }
            Self::Csv(err) => write!(f, "Failed to parse CSV: {err}"),
            Self::Repo(err) => write!(f, "Failed to import CSV: {err}"),
            Self::Cancelled => write!(f, "Import was cancelled before it committed"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPath { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}
