//! Application state management
//!
//! The SQLite connection is owned by the state behind a mutex. Handlers reach
//! it only through [`AppState::run_blocking`], which moves the work onto the
//! blocking thread pool; holding the lock there serializes imports and
//! deletes within the process.

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use lexicon_core::db::{open_db, DbResult};
use lexicon_core::ImportOptions;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct AppState {
    pub config: ServerConfig,
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Opens (and migrates) the database at `config.db_path`.
    pub fn new(config: ServerConfig) -> DbResult<Self> {
        let conn = open_db(&config.db_path)?;
        Ok(Self::with_connection(config, conn))
    }

    /// Wraps an already opened connection, e.g. an in-memory test database.
    pub fn with_connection(config: ServerConfig, conn: Connection) -> Self {
        Self {
            config,
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            max_upload_bytes: self.config.body_limit,
            ..ImportOptions::default()
        }
    }

    /// Runs `f` with exclusive access to the connection on a blocking thread.
    pub async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| ServerError::internal("database connection lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|err| ServerError::internal(format!("blocking task failed: {err}")))?
    }
}
