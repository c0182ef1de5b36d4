pub mod deployment_store;

pub use deployment_store::{DeploymentRecord, DeploymentStore};

use crate::error::{ChainlotError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};

/// SQLite-backed record store for the toolkit's deployment artifacts.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ChainlotError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS deployments (
                id TEXT PRIMARY KEY,
                network TEXT NOT NULL,
                contract TEXT NOT NULL,
                address TEXT NOT NULL,
                deployed_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
