//! Dictionary read and delete use-cases.
//!
//! # Invariants
//! - Word listing never returns an empty page past the end when matches
//!   exist; it falls back to the last page instead.
//! - Category deletion always cascades through the category store.
//! - Adding a category never modifies an existing one.

use crate::model::category::{Category, CategoryId};
use crate::model::word::{Word, WordPage};
use crate::repo::category_repo::{CascadeDelete, CategoryRepository};
use crate::repo::word_repo::{WordListQuery, WordRepository};
use crate::repo::{RepoError, RepoResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Full category tree plus icons, as shown on the landing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryData {
    pub categories: Vec<Category>,
    pub icons: BTreeMap<CategoryId, String>,
}

pub struct DictionaryService<C: CategoryRepository, W: WordRepository> {
    categories: C,
    words: W,
}

impl<C: CategoryRepository, W: WordRepository> DictionaryService<C, W> {
    pub fn new(categories: C, words: W) -> Self {
        Self { categories, words }
    }

    pub fn load_data(&self) -> RepoResult<DictionaryData> {
        Ok(DictionaryData {
            categories: self.categories.list_categories()?,
            icons: self.categories.list_icons()?,
        })
    }

    /// Lists one page of words.
    ///
    /// `page` and `page_size` are raised to at least 1. A page beyond the
    /// last one is answered with the last page.
    pub fn list_words(&self, query: &WordListQuery) -> RepoResult<WordPage> {
        let mut query = query.clone();
        query.page = query.page.max(1);
        query.page_size = query.page_size.max(1);

        let page = self.words.list_words(&query)?;
        let total_pages = page.total.div_ceil(u64::from(query.page_size));
        if total_pages > 0 && u64::from(query.page) > total_pages {
            query.page = u32::try_from(total_pages).unwrap_or(u32::MAX);
            return self.words.list_words(&query);
        }
        Ok(page)
    }

    pub fn delete_category(&self, id: &str) -> RepoResult<CascadeDelete> {
        self.categories.delete_category_cascade(id)
    }

    /// Creates `category` unless its id is taken; returns the stored row and
    /// whether it was created by this call.
    pub fn add_category(&self, category: &Category) -> RepoResult<(Category, bool)> {
        let created = self.categories.upsert_if_absent(category)?;
        let stored = self
            .categories
            .get_category(&category.id)?
            .ok_or_else(|| RepoError::NotFound {
                entity: "category",
                id: category.id.clone(),
            })?;
        Ok((stored, created))
    }

    pub fn save_icon(&self, category_id: &str, icon_data: &str) -> RepoResult<()> {
        self.categories.save_icon(category_id, icon_data)
    }

    pub fn get_icon(&self, category_id: &str) -> RepoResult<String> {
        self.categories
            .get_icon(category_id)?
            .ok_or_else(|| RepoError::NotFound {
                entity: "icon",
                id: category_id.to_string(),
            })
    }

    pub fn remove_icon(&self, category_id: &str) -> RepoResult<()> {
        self.categories.remove_icon(category_id)
    }

    /// Adds or replaces `word` and returns it as stored.
    pub fn add_word(&self, word: &Word) -> RepoResult<Word> {
        self.words.add_word(word)?;
        self.words
            .get_word(&word.id)?
            .ok_or_else(|| RepoError::NotFound {
                entity: "word",
                id: word.id.clone(),
            })
    }

    pub fn delete_word(&self, id: &str) -> RepoResult<()> {
        self.words.delete_word(id)
    }
}
