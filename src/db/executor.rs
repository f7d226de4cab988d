//! Execution of builder-produced queries
//!
//! Only [`SqlQuery`] values are accepted, so every value reaches SQLite as a
//! bound argument and never as part of the statement text.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow};
use sqlx::{Arguments, FromRow};

use super::DbEngine;
use crate::core::{SqlQuery, SqlValue};

/// Storage capability consumed by the table operations
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a statement that returns no rows
    async fn execute(&self, query: &SqlQuery) -> Result<SqliteQueryResult>;

    /// Fetch every matching row
    async fn fetch_all<T>(&self, query: &SqlQuery) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    /// Fetch at most one row; `None` means nothing matched
    async fn fetch_optional<T>(&self, query: &SqlQuery) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;
}

fn bind_args<'q>(args: &[SqlValue]) -> SqliteArguments<'q> {
    let mut arguments = SqliteArguments::default();
    for arg in args {
        match arg {
            SqlValue::Text(text) => arguments.add(text.clone()),
            SqlValue::Integer(value) => arguments.add(*value),
            SqlValue::Null => arguments.add(Option::<String>::None),
        }
    }
    arguments
}

#[async_trait]
impl QueryExecutor for DbEngine {
    async fn execute(&self, query: &SqlQuery) -> Result<SqliteQueryResult> {
        tracing::debug!(sql = %query.sql, args = ?query.args, "Executing statement");

        let result = sqlx::query_with(&query.sql, bind_args(&query.args))
            .execute(self.pool())
            .await?;

        Ok(result)
    }

    async fn fetch_all<T>(&self, query: &SqlQuery) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        tracing::debug!(sql = %query.sql, args = ?query.args, "Executing query");

        let rows = sqlx::query_as_with::<_, T, _>(&query.sql, bind_args(&query.args))
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    async fn fetch_optional<T>(&self, query: &SqlQuery) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        tracing::debug!(sql = %query.sql, args = ?query.args, "Executing query");

        let row = sqlx::query_as_with::<_, T, _>(&query.sql, bind_args(&query.args))
            .fetch_optional(self.pool())
            .await?;

        Ok(row)
    }
}

/// Whether `err` came from a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}
