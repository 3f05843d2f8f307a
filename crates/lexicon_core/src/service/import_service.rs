//! CSV import use-case service.
//!
//! # Responsibility
//! - Validate an uploaded CSV file and turn it into import records.
//! - Persist the resolved category tree, then one new word per record.
//! - Return the refreshed category set and word page.
//!
//! # Invariants
//! - Every record is validated before the first store write.
//! - Categories are written parents first with create-if-absent semantics;
//!   existing categories are never modified.
//! - Each word is bound to the leaf category of its record's path.
//! - Words are never deduplicated; every import adds one word per record.
//! - A cancelled import never commits; cancellation and commit are decided by
//!   one atomic transition, so the caller always learns which one won.

use crate::import::csv_reader::read_import_records;
use crate::import::resolver::plan_import;
use crate::import::ImportError;
use crate::model::category::Category;
use crate::model::word::{Word, WordPage};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::word_repo::{SqliteWordRepository, WordListQuery, WordRepository};
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// MIME type accepted for imports.
pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_RESULT_PAGE_SIZE: u32 = 1000;

/// File part received from the caller.
#[derive(Debug, Clone, Copy)]
pub struct UploadedFile<'a> {
    /// Declared MIME type, e.g. `text/csv; charset=utf-8`.
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> UploadedFile<'a> {
    pub fn csv(bytes: &'a [u8]) -> Self {
        Self {
            content_type: Some(CSV_CONTENT_TYPE),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Uploads larger than this are rejected before parsing.
    pub max_upload_bytes: usize,
    /// Page size used when re-reading words for the response.
    pub result_page_size: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            result_page_size: DEFAULT_RESULT_PAGE_SIZE,
        }
    }
}

const IMPORT_PENDING: u8 = 0;
const IMPORT_CANCELLED: u8 = 1;
const IMPORT_COMMITTING: u8 = 2;

/// Cancellation handle shared between a running import and its caller.
///
/// Clones observe the same state. The handle is single-use: once an import
/// has committed or been cancelled it stays in that state.
#[derive(Debug, Clone, Default)]
pub struct ImportCancellation {
    state: Arc<AtomicU8>,
}

impl ImportCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Returns `false` when the import already started committing; its
    /// result stands and must be awaited.
    pub fn cancel(&self) -> bool {
        match self.state.compare_exchange(
            IMPORT_PENDING,
            IMPORT_CANCELLED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => true,
            Err(current) => current == IMPORT_CANCELLED,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == IMPORT_CANCELLED
    }

    fn ensure_active(&self) -> Result<(), ImportError> {
        if self.is_cancelled() {
            return Err(ImportError::Cancelled);
        }
        Ok(())
    }

    /// Claims the right to commit; fails once cancellation has won.
    fn begin_commit(&self) -> Result<(), ImportError> {
        self.state
            .compare_exchange(
                IMPORT_PENDING,
                IMPORT_COMMITTING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|_| ImportError::Cancelled)
    }
}

/// Refreshed store contents returned after a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub categories: Vec<Category>,
    pub words: WordPage,
}

/// Import orchestrator over injected category and word stores.
pub struct ImportService<C: CategoryRepository, W: WordRepository> {
    categories: C,
    words: W,
    options: ImportOptions,
    cancellation: ImportCancellation,
}

impl<C: CategoryRepository, W: WordRepository> ImportService<C, W> {
    pub fn new(categories: C, words: W) -> Self {
        Self::with_options(categories, words, ImportOptions::default())
    }

    pub fn with_options(categories: C, words: W, options: ImportOptions) -> Self {
        Self {
            categories,
            words,
            options,
            cancellation: ImportCancellation::default(),
        }
    }

    /// Stops the import between store writes once `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: ImportCancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Runs the full import for one uploaded file.
    ///
    /// # Errors
    /// - `NoFile`, `UploadTooLarge`, `InvalidContentType` before parsing.
    /// - `MissingColumns`, `MissingFields`, `InvalidPath`, `Csv` before any
    ///   write.
    /// - `Cancelled` when the cancellation handle fired; checked after
    ///   parsing and before every store write.
    /// - `Repo` when a store rejects a write; earlier writes of this call are
    ///   not undone here (see `import_csv_atomically`).
    pub fn import(&self, upload: Option<UploadedFile<'_>>) -> Result<ImportOutcome, ImportError> {
        let started_at = Instant::now();
        match self.import_inner(upload) {
            Ok(outcome) => {
                info!(
                    "event=csv_import module=service status=ok duration_ms={} categories_total={} words_total={}",
                    started_at.elapsed().as_millis(),
                    outcome.categories.len(),
                    outcome.words.total
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    "event=csv_import module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn import_inner(&self, upload: Option<UploadedFile<'_>>) -> Result<ImportOutcome, ImportError> {
        let upload = upload.ok_or(ImportError::NoFile)?;
        if upload.bytes.len() > self.options.max_upload_bytes {
            return Err(ImportError::UploadTooLarge {
                size: upload.bytes.len(),
                limit: self.options.max_upload_bytes,
            });
        }
        if !is_csv_content_type(upload.content_type) {
            return Err(ImportError::InvalidContentType(
                upload.content_type.map(str::to_string),
            ));
        }

        let records = read_import_records(upload.bytes)?;
        self.cancellation.ensure_active()?;
        let plan = plan_import(&records);

        let mut created = 0usize;
        for category in &plan.categories {
            self.cancellation.ensure_active()?;
            if self.categories.upsert_if_absent(category)? {
                created += 1;
            }
        }

        for (record, leaf_id) in records.iter().zip(&plan.leaf_ids) {
            self.cancellation.ensure_active()?;
            let word = Word::new(
                record.term.as_str(),
                record.definition.as_str(),
                leaf_id.as_str(),
            );
            self.words.add_word(&word)?;
        }

        info!(
            "event=csv_import_persist module=service status=ok records={} categories_resolved={} categories_created={}",
            records.len(),
            plan.categories.len(),
            created
        );

        Ok(ImportOutcome {
            categories: self.categories.list_categories()?,
            words: self.words.list_words(&WordListQuery {
                page: 1,
                page_size: self.options.result_page_size,
                ..WordListQuery::default()
            })?,
        })
    }
}

/// Imports `upload` inside one IMMEDIATE transaction.
///
/// Commits only when every category and word write succeeded; any error
/// leaves the database exactly as it was.
pub fn import_csv_atomically(
    conn: &mut Connection,
    upload: Option<UploadedFile<'_>>,
    options: ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    import_csv_cancellable(conn, upload, options, &ImportCancellation::default())
}

/// Like [`import_csv_atomically`], but rolls back with
/// `ImportError::Cancelled` once `cancellation` fires before the commit.
///
/// A handle cancelled before the call returns without touching the
/// database.
pub fn import_csv_cancellable(
    conn: &mut Connection,
    upload: Option<UploadedFile<'_>>,
    options: ImportOptions,
    cancellation: &ImportCancellation,
) -> Result<ImportOutcome, ImportError> {
    cancellation.ensure_active()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let outcome = {
        let categories = SqliteCategoryRepository::try_new(&tx)?;
        let words = SqliteWordRepository::try_new(&tx)?;
        ImportService::with_options(categories, words, options)
            .with_cancellation(cancellation.clone())
            .import(upload)?
    };
    // Dropping `tx` on a lost race rolls the import back.
    cancellation.begin_commit()?;
    tx.commit()?;
    Ok(outcome)
}

/// Compares the MIME essence (before `;`) against `text/csv`.
pub fn is_csv_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(CSV_CONTENT_TYPE))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{is_csv_content_type, ImportCancellation};

    #[test]
    fn cancel_and_commit_are_mutually_exclusive() {
        let cancelled = ImportCancellation::new();
        assert!(cancelled.cancel());
        assert!(cancelled.cancel());
        assert!(cancelled.begin_commit().is_err());

        let committing = ImportCancellation::new();
        let caller_view = committing.clone();
        assert!(committing.begin_commit().is_ok());
        assert!(!caller_view.cancel());
        assert!(!caller_view.is_cancelled());
    }

    #[test]
    fn content_type_check_uses_mime_essence() {
        assert!(is_csv_content_type(Some("text/csv")));
        assert!(is_csv_content_type(Some("Text/CSV; charset=utf-8")));
        assert!(!is_csv_content_type(Some("text/plain")));
        assert!(!is_csv_content_type(Some("application/csv-like")));
        assert!(!is_csv_content_type(None));
    }
}
