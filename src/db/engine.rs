//! Database engine and connection management

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database engine wrapper. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct DbEngine {
    pool: SqlitePool,
}

impl DbEngine {
    /// Open (creating if missing) the database file and ensure the schema
    pub async fn connect(db_path: &Path, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database at {}", db_path.display()))?;

        let engine = Self { pool };
        engine.create_tables().await?;
        info!("Database ready at {}", db_path.display());

        Ok(engine)
    }

    /// Private in-memory database; a single connection keeps it alive
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let engine = Self { pool };
        engine.create_tables().await?;

        Ok(engine)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(&self) -> Result<()> {
        // Artist table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS artist (
                id_group INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create artist table")?;

        // Song table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS song (
                id_song INTEGER PRIMARY KEY AUTOINCREMENT,
                id_group INTEGER NOT NULL,
                title TEXT NOT NULL,
                release_date TEXT NOT NULL DEFAULT '',
                lyrics TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (id_group) REFERENCES artist(id_group) ON DELETE CASCADE,
                UNIQUE (id_group, title)
            );
            CREATE INDEX IF NOT EXISTS idx_song_title ON song(title);
            CREATE INDEX IF NOT EXISTS idx_song_release_date ON song(release_date);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create song table")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_creates_file_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("library.db");

        let engine = DbEngine::connect(&db_path, 2).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('artist', 'song') ORDER BY name",
        )
        .fetch_all(engine.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec![("artist".to_string(),), ("song".to_string(),)]);

        // reconnecting must not fail on the existing schema
        drop(engine);
        DbEngine::connect(&db_path, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_engines_are_isolated() {
        let a = DbEngine::in_memory().await.unwrap();
        let b = DbEngine::in_memory().await.unwrap();

        sqlx::query("INSERT INTO artist (name) VALUES ('Queen')")
            .execute(a.pool())
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM artist")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
