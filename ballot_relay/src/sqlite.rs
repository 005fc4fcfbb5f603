use crate::*;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, QueryBuilder, Sqlite};
use std::convert::TryFrom;
use std::path::PathBuf;

/// A key store backed by a single SQLite table
///
/// The store URI names a directory (optionally prefixed with `sqlite://`), the database name picks
/// the file inside it and the collection name is the table.
pub struct SqliteKeyStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteKeyStore {
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
    ) -> Result<Self, StoreError> {
        let path = database_path(uri, database)?;
        let opts = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        log::info!("Connected to key store at {}", path.display());

        Self::from_pool(pool, collection).await
    }

    /// Use an existing pool, creating the key table if needed
    pub async fn from_pool(pool: SqlitePool, collection: &str) -> Result<Self, StoreError> {
        let table = quote_collection(collection)?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL UNIQUE
            )",
            table
        ))
        .execute(&pool)
        .await?;

        Ok(SqliteKeyStore { pool, table })
    }
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn try_register(&self, key: &str) -> Result<Registration, StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (key) VALUES (?) ON CONFLICT (key) DO NOTHING",
            self.table
        ))
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(Registration {
            inserted: result.rows_affected() == 1,
        })
    }

    async fn take_batch(&self, limit: usize) -> Result<Vec<PendingKey>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(&format!(
            "SELECT id, key FROM {} ORDER BY id LIMIT ?",
            self.table
        ))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, key)| PendingKey { id, key })
            .collect())
    }

    async fn delete_by_ids(&self, ids: &[KeyId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("DELETE FROM {} WHERE id IN (", self.table));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    // Select, threshold check and delete run as one statement
    async fn claim_batch(
        &self,
        limit: usize,
        min_size: usize,
    ) -> Result<Vec<PendingKey>, StoreError> {
        let limit = sql_limit(limit);
        let min_size = sql_limit(min_size);

        let mut rows: Vec<(i64, String)> = sqlx::query_as(&format!(
            "DELETE FROM {table}
             WHERE id IN (SELECT id FROM {table} ORDER BY id LIMIT ?)
               AND (SELECT COUNT(*) FROM (SELECT id FROM {table} LIMIT ?)) >= ?
             RETURNING id, key",
            table = self.table
        ))
        .bind(limit)
        .bind(limit)
        .bind(min_size)
        .fetch_all(&self.pool)
        .await?;

        // RETURNING order is unspecified
        rows.sort_by_key(|(id, _)| *id);

        Ok(rows
            .into_iter()
            .map(|(id, key)| PendingKey { id, key })
            .collect())
    }
}

fn database_path(uri: &str, database: &str) -> Result<PathBuf, StoreError> {
    let dir = uri.strip_prefix("sqlite://").unwrap_or(uri);
    if dir.is_empty() || database.is_empty() || database.contains(&['/', '\\'][..]) {
        return Err(StoreError::InvalidUri(format!("{} ({})", uri, database)));
    }

    Ok(PathBuf::from(dir).join(format!("{}.db", database)))
}

// Table names cannot be bound as parameters, so only plain identifiers are accepted
fn quote_collection(collection: &str) -> Result<String, StoreError> {
    let mut chars = collection.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid {
        return Err(StoreError::InvalidCollectionName(collection.to_owned()));
    }

    Ok(format!("\"{}\"", collection))
}

fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
