use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use super::error::ApiError;

/// Shared by every handler. Each request holds the connection only for its own queries.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }

    /// Runs blocking database work on the blocking pool, off the async workers.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = state.db()?;
            work(&conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Database task failed: {}", e)))?
    }
}
