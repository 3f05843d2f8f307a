//! Category store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist category tree nodes and their icons.
//! - Own cascade deletion of a category subtree with its words and icons.
//!
//! # Invariants
//! - `upsert_if_absent` never overwrites an existing row.
//! - A category is only inserted once its parent exists.
//! - Cascade deletion leaves no word, icon or child pointing at a removed id.

use crate::model::category::{Category, CategoryId};
use crate::repo::{category_exists, ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, HashMap, VecDeque};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    parent_id,
    icon
FROM categories";

/// Summary of one cascade deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeDelete {
    /// Removed category ids, target first, then descendants breadth-first.
    pub category_ids: Vec<CategoryId>,
    pub words_deleted: usize,
    pub icons_deleted: usize,
}

/// Repository interface for the category store.
pub trait CategoryRepository {
    /// Lists every category ordered by id.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: &str) -> RepoResult<Option<Category>>;
    /// Inserts the category unless a row with the same id exists.
    ///
    /// Returns `true` when a row was inserted.
    fn upsert_if_absent(&self, category: &Category) -> RepoResult<bool>;
    /// Deletes a category, all of its descendants, their words and icons.
    fn delete_category_cascade(&self, id: &str) -> RepoResult<CascadeDelete>;
    /// Stores icon data for a category, replacing any previous icon.
    fn save_icon(&self, category_id: &str, icon_data: &str) -> RepoResult<()>;
    fn get_icon(&self, category_id: &str) -> RepoResult<Option<String>>;
    fn remove_icon(&self, category_id: &str) -> RepoResult<()>;
    /// Returns every stored icon keyed by category id.
    fn list_icons(&self) -> RepoResult<BTreeMap<CategoryId, String>>;
}

/// SQLite-backed category store.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories", "icons", "words"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn get_category(&self, id: &str) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn upsert_if_absent(&self, category: &Category) -> RepoResult<bool> {
        category.validate()?;

        if let Some(parent_id) = category.parent_id.as_deref() {
            if !category_exists(self.conn, parent_id)? {
                return Err(RepoError::CategoryNotFound(parent_id.to_string()));
            }
        }

        let changed = self.conn.execute(
            "INSERT INTO categories (id, name, description, parent_id, icon)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO NOTHING;",
            params![
                category.id.as_str(),
                category.name.as_str(),
                category.description.as_str(),
                category.parent_id.as_deref(),
                category.icon.as_deref(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_category_cascade(&self, id: &str) -> RepoResult<CascadeDelete> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !category_exists(&tx, id)? {
            return Err(RepoError::NotFound {
                entity: "category",
                id: id.to_string(),
            });
        }

        let children_by_parent = load_child_adjacency(&tx)?;
        let subtree = collect_subtree(id, &children_by_parent);

        let mut summary = CascadeDelete::default();
        for category_id in &subtree {
            summary.words_deleted +=
                tx.execute("DELETE FROM words WHERE category_id = ?1;", [category_id])?;
            summary.icons_deleted +=
                tx.execute("DELETE FROM icons WHERE category_id = ?1;", [category_id])?;
        }
        // Deepest nodes first so no row ever points at a deleted parent.
        for category_id in subtree.iter().rev() {
            tx.execute("DELETE FROM categories WHERE id = ?1;", [category_id])?;
        }
        tx.commit()?;

        info!(
            "event=category_delete module=repo status=ok categories={} words={} icons={}",
            subtree.len(),
            summary.words_deleted,
            summary.icons_deleted
        );
        summary.category_ids = subtree;
        Ok(summary)
    }

    fn save_icon(&self, category_id: &str, icon_data: &str) -> RepoResult<()> {
        if !category_exists(self.conn, category_id)? {
            return Err(RepoError::CategoryNotFound(category_id.to_string()));
        }
        self.conn.execute(
            "INSERT INTO icons (category_id, icon_data)
             VALUES (?1, ?2)
             ON CONFLICT(category_id) DO UPDATE SET icon_data = excluded.icon_data;",
            params![category_id, icon_data],
        )?;
        Ok(())
    }

    fn get_icon(&self, category_id: &str) -> RepoResult<Option<String>> {
        let icon = self
            .conn
            .query_row(
                "SELECT icon_data FROM icons WHERE category_id = ?1;",
                [category_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(icon)
    }

    fn remove_icon(&self, category_id: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM icons WHERE category_id = ?1;", [category_id])?;
        Ok(())
    }

    fn list_icons(&self) -> RepoResult<BTreeMap<CategoryId, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT category_id, icon_data FROM icons;")?;
        let mut rows = stmt.query([])?;
        let mut icons = BTreeMap::new();
        while let Some(row) = rows.next()? {
            icons.insert(row.get(0)?, row.get(1)?);
        }
        Ok(icons)
    }
}

fn load_child_adjacency(conn: &Connection) -> RepoResult<HashMap<CategoryId, Vec<CategoryId>>> {
    let mut stmt = conn.prepare(
        "SELECT id, parent_id
         FROM categories
         WHERE parent_id IS NOT NULL
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut children_by_parent: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let id: CategoryId = row.get(0)?;
        let parent_id: CategoryId = row.get(1)?;
        children_by_parent.entry(parent_id).or_default().push(id);
    }
    Ok(children_by_parent)
}

/// Breadth-first walk from `root_id`; the root comes first.
fn collect_subtree(
    root_id: &str,
    children_by_parent: &HashMap<CategoryId, Vec<CategoryId>>,
) -> Vec<CategoryId> {
    let mut ordered = Vec::new();
    let mut queue = VecDeque::from([root_id.to_string()]);
    while let Some(current) = queue.pop_front() {
        if ordered.contains(&current) {
            continue;
        }
        if let Some(children) = children_by_parent.get(&current) {
            queue.extend(children.iter().cloned());
        }
        ordered.push(current);
    }
    ordered
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let category = Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row
            .get::<_, Option<String>>("description")?
            .unwrap_or_default(),
        parent_id: row.get("parent_id")?,
        icon: row.get("icon")?,
    };
    category
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("categories row: {err}")))?;
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::collect_subtree;
    use std::collections::HashMap;

    #[test]
    fn collect_subtree_walks_breadth_first() {
        let mut children = HashMap::new();
        children.insert("a".to_string(), vec!["a-b".to_string(), "a-c".to_string()]);
        children.insert("a-b".to_string(), vec!["a-b-d".to_string()]);

        assert_eq!(collect_subtree("a", &children), vec!["a", "a-b", "a-c", "a-b-d"]);
        assert_eq!(collect_subtree("a-c", &children), vec!["a-c"]);
    }
}
