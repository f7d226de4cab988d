//! Artist (group) table operations

use anyhow::{Context, Result};

use crate::core::SqlQuery;
use crate::db::QueryExecutor;

/// Artist table operations
pub struct ArtistTable;

impl ArtistTable {
    /// Look up an artist ID by exact name
    pub async fn get_id(db: &impl QueryExecutor, name: &str) -> Result<Option<i64>> {
        let query = SqlQuery::new(
            "SELECT id_group FROM artist WHERE name = ?1",
            vec![name.into()],
        );
        let row: Option<(i64,)> = db.fetch_optional(&query).await?;
        Ok(row.map(|(id,)| id))
    }

    /// Return the artist's ID, inserting the artist first if needed
    pub async fn get_or_insert(db: &impl QueryExecutor, name: &str) -> Result<i64> {
        let insert = SqlQuery::new(
            "INSERT INTO artist (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            vec![name.into()],
        );
        db.execute(&insert).await?;

        Self::get_id(db, name)
            .await?
            .with_context(|| format!("Artist '{}' missing after insert", name))
    }

    /// Delete the artist if no song refers to it any more; returns rows
    /// affected
    pub async fn delete_if_orphaned(db: &impl QueryExecutor, id_group: i64) -> Result<u64> {
        let query = SqlQuery::new(
            "DELETE FROM artist WHERE id_group = ?1 \
             AND NOT EXISTS (SELECT 1 FROM song WHERE song.id_group = ?1)",
            vec![id_group.into()],
        );
        let result = db.execute(&query).await?;
        Ok(result.rows_affected())
    }

    /// Count artists
    pub async fn count(db: &impl QueryExecutor) -> Result<i64> {
        let query = SqlQuery::new("SELECT COUNT(*) FROM artist", Vec::new());
        let row: Option<(i64,)> = db.fetch_optional(&query).await?;
        Ok(row.map_or(0, |(count,)| count))
    }
}
