//! Word model and identifier generation.
//!
//! # Invariants
//! - `category` references an existing category at persist time; the word
//!   repository enforces this, not the model.
//! - Generated ids combine a term slug, the creation time and a random
//!   suffix, so repeated imports of the same term never collide.

use crate::model::category::CategoryId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Word identifier.
pub type WordId = String;

const RANDOM_SUFFIX_LEN: usize = 12;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

/// User-defined name/value pair attached to a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

/// Dictionary entry bound to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    pub term: String,
    pub definition: String,
    /// Id of the category this word belongs to.
    pub category: CategoryId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// One page of words plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    BlankId,
    BlankTerm,
    BlankDefinition,
    BlankCategory,
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "word id must not be blank"),
            Self::BlankTerm => write!(f, "word term must not be blank"),
            Self::BlankDefinition => write!(f, "word definition must not be blank"),
            Self::BlankCategory => write!(f, "word category must not be blank"),
        }
    }
}

impl Error for WordValidationError {}

impl Word {
    /// Creates a word stamped with the current time and a fresh id.
    pub fn new(
        term: impl Into<String>,
        definition: impl Into<String>,
        category: impl Into<CategoryId>,
    ) -> Self {
        let term = term.into();
        let created_at = now_epoch_ms();
        Self {
            id: generate_word_id(&term, created_at),
            term,
            definition: definition.into(),
            category: category.into(),
            created_at,
            custom_fields: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), WordValidationError> {
        if self.id.trim().is_empty() {
            return Err(WordValidationError::BlankId);
        }
        if self.term.trim().is_empty() {
            return Err(WordValidationError::BlankTerm);
        }
        if self.definition.trim().is_empty() {
            return Err(WordValidationError::BlankDefinition);
        }
        if self.category.trim().is_empty() {
            return Err(WordValidationError::BlankCategory);
        }
        Ok(())
    }
}

/// Lowercases a term and collapses whitespace runs into `-`.
pub fn slugify(value: &str) -> String {
    WHITESPACE_RUN
        .replace_all(value.trim(), "-")
        .to_lowercase()
}

/// Builds `<term-slug>-<created_at>-<random hex>`.
pub fn generate_word_id(term: &str, created_at: i64) -> WordId {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        slugify(term),
        created_at,
        &random[..RANDOM_SUFFIX_LEN]
    )
}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
