// ABOUTME: Database connection management and schema migrations
// ABOUTME: Opens the SQLite pool with the pragmas the tagging tables rely on

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::StorageError;

/// Open (creating if needed) the database at `database_path` and run migrations.
/// Falls back to `~/.tagging/tagging.db` when no path is given.
pub async fn connect(database_path: Option<PathBuf>) -> Result<SqlitePool, StorageError> {
    let database_path = database_path.unwrap_or_else(tagging_core::database_file);

    // Ensure parent directory exists
    if let Some(parent) = database_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = open_pool(&database_path).await?;

    info!("Database connection established: {}", database_path.display());

    run_migrations(&pool).await?;
    Ok(pool)
}

/// In-memory database with the schema applied. Single connection so every
/// query sees the same data.
pub async fn connect_in_memory() -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Apply the embedded migrations under `packages/storage/migrations`
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    debug!("Database migrations completed");
    Ok(())
}

async fn open_pool(database_path: &Path) -> Result<SqlitePool, StorageError> {
    let database_url = format!("sqlite:{}", database_path.display());

    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Configure connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    // Configure SQLite settings
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_creates_file_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tagging.db");

        let pool = connect(Some(path.clone())).await.unwrap();
        assert!(path.exists());

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('tags', 'tagged_items')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_in_memory_enforces_foreign_keys() {
        let pool = connect_in_memory().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO tagged_items (id, tag_id, content_type, object_id, created_at) VALUES ('i', 'missing', 'article', '1', '2024-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }
}
