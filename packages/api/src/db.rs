// ABOUTME: Database connection management and storage initialization
// ABOUTME: Opens the SQLite database and shares tag storage with handlers

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use tagging_config::TaggingSettings;
use tagging_storage::StorageError;
use tagging_tags::TagStorage;

/// Shared database state for API handlers
#[derive(Clone)]
pub struct DbState {
    pub tag_storage: Arc<TagStorage>,
}

impl DbState {
    /// Create new database state from a SQLite pool
    pub fn new(pool: SqlitePool, settings: TaggingSettings) -> Self {
        let tag_storage = Arc::new(TagStorage::with_settings(pool, settings));
        Self { tag_storage }
    }

    /// Initialize database state with optional custom database path
    pub async fn init_with_path(
        database_path: Option<PathBuf>,
        settings: TaggingSettings,
    ) -> Result<Self, StorageError> {
        let pool = tagging_storage::connect(database_path).await?;
        info!("Tag storage ready");
        Ok(Self::new(pool, settings))
    }

    /// Fresh in-memory database, used by tests and one-off runs
    pub async fn in_memory(settings: TaggingSettings) -> Result<Self, StorageError> {
        let pool = tagging_storage::connect_in_memory().await?;
        Ok(Self::new(pool, settings))
    }

    pub fn settings(&self) -> &TaggingSettings {
        self.tag_storage.settings()
    }
}
