//! HTTP route handlers and router configuration

mod data;
mod entries;
mod import;

use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{delete, get, post},
    Router,
};
use log::warn;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(data::health))
        .route("/api/data", get(data::load_data))
        .route("/api/words", get(data::list_words).post(entries::add_word))
        .route("/api/words/:id", delete(entries::delete_word))
        .route("/api/categories", post(entries::add_category))
        .route("/api/categories/:id", delete(data::delete_category))
        .route(
            "/api/icons/:category_id",
            post(entries::save_icon)
                .get(entries::get_icon)
                .delete(entries::remove_icon),
        )
        .route("/api/import", post(import::import_csv))
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .with_state(state.clone());

    if let Some(cors) = cors_layer(&state.config.cors_origin) {
        router = router.layer(cors);
    }

    router
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = origin.trim();
    if origin.is_empty() {
        return None;
    }
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    if origin == "*" {
        return Some(layer.allow_origin(Any));
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => Some(layer.allow_origin(value)),
        Err(_) => {
            warn!("event=cors_config module=server status=error origin_invalid=true");
            None
        }
    }
}
