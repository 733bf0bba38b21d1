use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const CREATE_RESUMES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS resumes (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        created_at TEXT NOT NULL
    )";

/// Opens the SQLite database (creating the file if needed) and ensures the schema exists.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL '{database_url}'"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open resume storage")?;

    migrate(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_RESUMES_TABLE)
        .execute(pool)
        .await
        .context("Failed to create resumes table")?;
    Ok(())
}

/// Single-connection in-memory database; every connection would otherwise get its own.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumes.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_pool(&url).await.unwrap();
        assert!(path.exists());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resumes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        // Re-opening is idempotent
        pool.close().await;
        create_pool(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_unopenable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/missing/dir/resumes.db", dir.path().display());
        assert!(create_pool(&url).await.is_err());
    }
}
