//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the category and word store contracts consumed by services.
//! - Isolate SQLite query details from import orchestration.
//!
//! # Invariants
//! - Repository writes validate records before any SQL mutation.
//! - Repositories borrow a `&Connection`, so they work unchanged on top of
//!   an open transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::category::{CategoryId, CategoryValidationError};
use crate::model::word::WordValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_repo;
pub mod word_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for category/word persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidCategory(CategoryValidationError),
    InvalidWord(WordValidationError),
    Db(DbError),
    /// Target row does not exist.
    NotFound {
        entity: &'static str,
        id: String,
    },
    /// A write referenced a category that does not exist.
    CategoryNotFound(CategoryId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCategory(err) => write!(f, "{err}"),
            Self::InvalidWord(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category {id} does not exist"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "dictionary repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "dictionary repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCategory(err) => Some(err),
            Self::InvalidWord(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CategoryValidationError> for RepoError {
    fn from(value: CategoryValidationError) -> Self {
        Self::InvalidCategory(value)
    }
}

impl From<WordValidationError> for RepoError {
    fn from(value: WordValidationError) -> Self {
        Self::InvalidWord(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn category_exists(conn: &Connection, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
