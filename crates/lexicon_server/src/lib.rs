//! Lexicon HTTP server
//!
//! A thin axum REST layer over `lexicon_core`.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `GET /api/data`: categories plus icons
//! - `GET /api/words`: paginated word listing
//! - `DELETE /api/categories/:id`: cascading category delete
//! - `POST /api/import`: multipart CSV import

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use axum::Router;
use lexicon_core::db::DbResult;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct LexiconServer {
    state: Arc<AppState>,
    router: Router,
}

impl LexiconServer {
    /// Opens the database and builds the router.
    pub fn new(config: ServerConfig) -> DbResult<Self> {
        let state = Arc::new(AppState::new(config)?);
        let router = routes::build_router(state.clone());
        Ok(Self { state, router })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serves until the process receives Ctrl-C.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;
        info!(
            "event=server_listen module=server status=ok addr={} db_path={}",
            addr,
            self.state.config.db_path.display()
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("event=server_shutdown module=server status=ok");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_shutdown module=server status=error error={err}");
    }
}
