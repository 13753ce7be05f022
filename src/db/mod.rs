/// Database layer for the bodega API
///
/// Manages the SQLite connection pool, runs embedded migrations, and defines
/// the persisted row types shared by the managers.

pub mod models;

use crate::error::{ApiError, ApiResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
///
/// An in-memory database is pinned to a single connection without WAL; every
/// pooled connection to `:memory:` would otherwise open its own empty
/// database.
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> ApiResult<SqlitePool> {
    let in_memory = path == Path::new(":memory:");

    // Ensure parent directory exists
    if !in_memory {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let max_connections = if in_memory { 1 } else { options.max_connections };
    let journal_mode = if options.enable_wal && !in_memory {
        SqliteJournalMode::Wal
    } else {
        SqliteJournalMode::Delete
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(journal_mode)
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await
        .map_err(ApiError::Database)?;

    Ok(pool)
}

/// Run migrations for the database
/// Migrations are embedded at compile time from ./migrations directory
pub async fn run_migrations(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Migration failed: {}", e)))?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(ApiError::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_pool_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("bodega.sqlite");

        let pool = create_pool(&path, DatabaseOptions::default())
            .await
            .expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");
        test_connection(&pool).await.expect("Ping failed");
    }

    #[tokio::test]
    async fn in_memory_pool_runs_migrations() {
        let pool = create_pool(Path::new(":memory:"), DatabaseOptions::default())
            .await
            .expect("Failed to create pool");
        run_migrations(&pool).await.expect("Migrations failed");
        test_connection(&pool).await.expect("Ping failed");
    }
}
