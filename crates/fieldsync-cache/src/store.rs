//! SQLite implementation of IDurableStore
//!
//! One flat `kv_entries` table holds every namespaced key in the system:
//! cache envelopes, queue records, sync bookkeeping. Values are opaque
//! blobs; callers own their encoding. A write is committed before the
//! call returns, which is what the pending-change queue relies on for
//! crash safety.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use fieldsync_core::ports::IDurableStore;

use crate::CacheError;

const SCHEMA: &str = include_str!("migrations/20260615_initial.sql");

/// SQLite-backed durable key/value store
///
/// Owns its connection pool. File-backed stores run in WAL mode with a
/// small pool so cache reads and queue writes can overlap; the database
/// itself is the serialization point for same-key writes (last write
/// wins).
pub struct SqliteDurableStore {
    pool: SqlitePool,
}

impl SqliteDurableStore {
    /// Opens (or creates) the database at `db_path` and applies the schema
    ///
    /// Missing parent directories are created. The connection uses WAL
    /// journaling and a 5 second busy timeout; `kv_entries` is created if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the file or directory
    /// cannot be opened, `CacheError::MigrationFailed` if the schema
    /// cannot be applied.
    pub async fn open(db_path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::ConnectionFailed(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!("cannot open {}: {e}", db_path.display()))
            })?;

        Self::apply_schema(&pool).await?;

        info!(path = %db_path.display(), "Durable store opened");
        Ok(Self { pool })
    }

    /// Opens a store backed by an in-memory database, for tests
    ///
    /// A SQLite in-memory database lives and dies with its connection, so
    /// the pool is pinned to a single connection.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`open`](Self::open), minus the filesystem.
    pub async fn open_in_memory() -> Result<Self, CacheError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!("cannot open in-memory database: {e}"))
            })?;

        Self::apply_schema(&pool).await?;

        debug!("In-memory durable store opened");
        Ok(Self { pool })
    }

    async fn apply_schema(pool: &SqlitePool) -> Result<(), CacheError> {
        sqlx::raw_sql(SCHEMA)
            .execute(pool)
            .await
            .map_err(|e| CacheError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}

/// Escape LIKE wildcards so a prefix scan matches literally
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl IDurableStore for SqliteDurableStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<Vec<u8>, _>("value")))
    }

    async fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at) VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::trace!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::trace!(key, "Deleted key");
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let pattern = format!("{}%", escape_like(prefix));

        let rows =
            sqlx::query("SELECT key FROM kv_entries WHERE key LIKE ? ESCAPE '\\' ORDER BY key")
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(|r| r.get::<String, _>("key")).collect())
    }

    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM kv_entries WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::trace!(count = keys.len(), "Deleted keys");
        Ok(())
    }
}
