//! Read and delete endpoints over the dictionary store.

use crate::error::Result;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use lexicon_core::{
    DictionaryData, DictionaryService, SqliteCategoryRepository, SqliteWordRepository,
    WordListQuery, WordPage,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

pub async fn health() -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn load_data(State(state): State<Arc<AppState>>) -> Result<Json<DictionaryData>> {
    let data = state
        .run_blocking(|conn| {
            let service = DictionaryService::new(
                SqliteCategoryRepository::try_new(conn)?,
                SqliteWordRepository::try_new(conn)?,
            );
            Ok(service.load_data()?)
        })
        .await?;
    Ok(Json(data))
}

/// Raw `/api/words` query string. Unparseable numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordsParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub category_id: Option<String>,
    pub search_term: Option<String>,
}

impl WordsParams {
    fn into_query(self) -> WordListQuery {
        let defaults = WordListQuery::default();
        WordListQuery {
            page: parse_number(self.page).unwrap_or(defaults.page),
            page_size: parse_number(self.page_size).unwrap_or(defaults.page_size),
            category_id: non_blank(self.category_id),
            search_term: non_blank(self.search_term),
        }
    }
}

fn parse_number(value: Option<String>) -> Option<u32> {
    value.and_then(|raw| raw.trim().parse().ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

pub async fn list_words(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WordsParams>,
) -> Result<Json<WordPage>> {
    let query = params.into_query();
    let page = state
        .run_blocking(move |conn| {
            let service = DictionaryService::new(
                SqliteCategoryRepository::try_new(conn)?,
                SqliteWordRepository::try_new(conn)?,
            );
            Ok(service.list_words(&query)?)
        })
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategoryResponse {
    pub success: bool,
    pub deleted_category_ids: Vec<String>,
    pub words_deleted: usize,
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteCategoryResponse>> {
    let deleted = state
        .run_blocking(move |conn| {
            let service = DictionaryService::new(
                SqliteCategoryRepository::try_new(conn)?,
                SqliteWordRepository::try_new(conn)?,
            );
            Ok(service.delete_category(&id)?)
        })
        .await?;
    info!(
        "event=category_delete module=server status=ok categories={} words={}",
        deleted.category_ids.len(),
        deleted.words_deleted
    );
    Ok(Json(DeleteCategoryResponse {
        success: true,
        deleted_category_ids: deleted.category_ids,
        words_deleted: deleted.words_deleted,
    }))
}
