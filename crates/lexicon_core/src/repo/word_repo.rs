//! Word store contracts and SQLite implementation.
//!
//! # Invariants
//! - `add_word` refuses words whose category does not exist.
//! - Listing is deterministic: `term ASC, id ASC`.
//! - `search_term` is a literal prefix match; `%` and `_` carry no meaning.
//! - Prefix matching ignores case for ASCII letters only (SQLite `LIKE`).

use crate::model::category::CategoryId;
use crate::model::word::{CustomField, Word, WordPage};
use crate::repo::{category_exists, ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const WORD_SELECT_SQL: &str = "SELECT
    id,
    term,
    definition,
    category_id,
    created_at,
    custom_fields
FROM words";

pub const WORDS_DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter and pagination options for listing words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordListQuery {
    /// 1-based page number. `0` is read as the first page.
    pub page: u32,
    pub page_size: u32,
    /// Restrict to words bound directly to this category.
    pub category_id: Option<CategoryId>,
    /// Term prefix. Case folding covers ASCII letters only, so `é` never
    /// matches `É`.
    pub search_term: Option<String>,
}

impl Default for WordListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: WORDS_DEFAULT_PAGE_SIZE,
            category_id: None,
            search_term: None,
        }
    }
}

/// Repository interface for the word store.
pub trait WordRepository {
    /// Adds the word, replacing any existing word with the same id.
    fn add_word(&self, word: &Word) -> RepoResult<()>;
    fn get_word(&self, id: &str) -> RepoResult<Option<Word>>;
    fn list_words(&self, query: &WordListQuery) -> RepoResult<WordPage>;
    fn delete_word(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed word store.
pub struct SqliteWordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWordRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories", "words"])?;
        Ok(Self { conn })
    }
}

impl WordRepository for SqliteWordRepository<'_> {
    fn add_word(&self, word: &Word) -> RepoResult<()> {
        word.validate()?;
        if !category_exists(self.conn, &word.category)? {
            return Err(RepoError::CategoryNotFound(word.category.clone()));
        }

        let custom_fields = serde_json::to_string(&word.custom_fields)
            .map_err(|err| RepoError::InvalidData(format!("custom fields: {err}")))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO words (
                id,
                term,
                definition,
                category_id,
                created_at,
                custom_fields
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                word.id.as_str(),
                word.term.as_str(),
                word.definition.as_str(),
                word.category.as_str(),
                word.created_at,
                custom_fields,
            ],
        )?;
        Ok(())
    }

    fn get_word(&self, id: &str) -> RepoResult<Option<Word>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_word_row(row)?));
        }
        Ok(None)
    }

    fn list_words(&self, query: &WordListQuery) -> RepoResult<WordPage> {
        let mut where_sql = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category_id) = query.category_id.as_ref() {
            where_sql.push_str(" AND category_id = ?");
            bind_values.push(Value::Text(category_id.clone()));
        }
        if let Some(search_term) = query.search_term.as_ref().filter(|term| !term.is_empty()) {
            where_sql.push_str(" AND term LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(format!("{}%", escape_like(search_term))));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM words{where_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let page_size = query.page_size.max(1);
        let offset = i64::from(query.page.max(1) - 1) * i64::from(page_size);
        let mut page_values = bind_values;
        page_values.push(Value::Integer(i64::from(page_size)));
        page_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&format!(
            "{WORD_SELECT_SQL}{where_sql} ORDER BY term ASC, id ASC LIMIT ? OFFSET ?;"
        ))?;
        let mut rows = stmt.query(params_from_iter(page_values))?;
        let mut words = Vec::new();
        while let Some(row) = rows.next()? {
            words.push(parse_word_row(row)?);
        }

        Ok(WordPage {
            words,
            total: total.max(0) as u64,
        })
    }

    fn delete_word(&self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM words WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "word",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    let custom_fields_text: String = row.get("custom_fields")?;
    let custom_fields: Vec<CustomField> = serde_json::from_str(&custom_fields_text)
        .map_err(|err| RepoError::InvalidData(format!("words.custom_fields: {err}")))?;

    let word = Word {
        id: row.get("id")?,
        term: row.get("term")?,
        definition: row.get("definition")?,
        category: row.get("category_id")?,
        created_at: row.get("created_at")?,
        custom_fields,
    };
    word.validate()
        .map_err(|err| RepoError::InvalidData(format!("words row: {err}")))?;
    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
