//! Core domain logic for the Lexicon dictionary manager.
//! This crate is the single source of truth for category tree and word
//! invariants, including the CSV import pipeline.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use import::csv_reader::{read_import_records, REQUIRED_COLUMNS};
pub use import::path::{parse_category_path, CategoryPath, PathError, PATH_DELIMITER};
pub use import::resolver::{parent_ordered, plan_import, CategoryTreeResolver, ImportPlan};
pub use import::{ImportError, ImportRecord};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::category::{category_id_for, Category, CategoryId};
pub use model::word::{
    generate_word_id, now_epoch_ms, slugify, CustomField, Word, WordId, WordPage,
};
pub use repo::category_repo::{CascadeDelete, CategoryRepository, SqliteCategoryRepository};
pub use repo::word_repo::{SqliteWordRepository, WordListQuery, WordRepository};
pub use repo::{RepoError, RepoResult};
pub use service::dictionary_service::{DictionaryData, DictionaryService};
pub use service::import_service::{
    import_csv_atomically, import_csv_cancellable, is_csv_content_type, ImportCancellation,
    ImportOptions, ImportOutcome, ImportService, UploadedFile, CSV_CONTENT_TYPE,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
