//! Write endpoints for single categories, icons and words.

use crate::error::Result;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lexicon_core::{
    generate_word_id, now_epoch_ms, Category, CategoryId, CustomField, DictionaryService,
    SqliteCategoryRepository, SqliteWordRepository, Word,
};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

type SqliteDictionary<'conn> =
    DictionaryService<SqliteCategoryRepository<'conn>, SqliteWordRepository<'conn>>;

fn dictionary(conn: &Connection) -> Result<SqliteDictionary<'_>> {
    Ok(DictionaryService::new(
        SqliteCategoryRepository::try_new(conn)?,
        SqliteWordRepository::try_new(conn)?,
    ))
}

#[derive(Debug, Serialize)]
pub struct AddCategoryResponse {
    pub success: bool,
    pub created: bool,
    pub category: Category,
}

/// An existing category with the same id is left untouched.
pub async fn add_category(
    State(state): State<Arc<AppState>>,
    Json(category): Json<Category>,
) -> Result<Json<AddCategoryResponse>> {
    let (category, created) = state
        .run_blocking(move |conn| Ok(dictionary(conn)?.add_category(&category)?))
        .await?;
    info!(
        "event=category_add module=server status=ok created={}",
        created
    );
    Ok(Json(AddCategoryResponse {
        success: true,
        created,
        category,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconBody {
    pub icon_data: String,
}

pub async fn save_icon(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
    Json(body): Json<IconBody>,
) -> Result<Json<JsonValue>> {
    let icon_data = state
        .run_blocking(move |conn| {
            dictionary(conn)?.save_icon(&category_id, &body.icon_data)?;
            Ok(body.icon_data)
        })
        .await?;
    Ok(Json(json!({ "iconUrl": icon_data })))
}

pub async fn get_icon(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<JsonValue>> {
    let icon_data = state
        .run_blocking(move |conn| Ok(dictionary(conn)?.get_icon(&category_id)?))
        .await?;
    Ok(Json(json!({ "iconData": icon_data })))
}

pub async fn remove_icon(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<JsonValue>> {
    state
        .run_blocking(move |conn| Ok(dictionary(conn)?.remove_icon(&category_id)?))
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/words` body. Missing `id` and `createdAt` are generated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordBody {
    pub id: Option<String>,
    pub term: String,
    #[serde(default)]
    pub definition: String,
    pub category: CategoryId,
    pub created_at: Option<i64>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl WordBody {
    fn into_word(self) -> Word {
        let created_at = self.created_at.unwrap_or_else(now_epoch_ms);
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_word_id(&self.term, created_at));
        Word {
            id,
            term: self.term,
            definition: self.definition,
            category: self.category,
            created_at,
            custom_fields: self.custom_fields,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddWordResponse {
    pub success: bool,
    pub word: Word,
}

/// Adds or replaces a word; its category must already exist.
pub async fn add_word(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WordBody>,
) -> Result<Json<AddWordResponse>> {
    let word = body.into_word();
    let word = state
        .run_blocking(move |conn| Ok(dictionary(conn)?.add_word(&word)?))
        .await?;
    info!(
        "event=word_add module=server status=ok custom_fields={}",
        word.custom_fields.len()
    );
    Ok(Json(AddWordResponse {
        success: true,
        word,
    }))
}

pub async fn delete_word(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>> {
    state
        .run_blocking(move |conn| Ok(dictionary(conn)?.delete_word(&id)?))
        .await?;
    Ok(Json(json!({ "success": true })))
}
