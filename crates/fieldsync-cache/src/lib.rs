//! FieldSync Cache - Local state persistence
//!
//! SQLite-based durable store plus the TTL cache engine that sits on it:
//! - Opaque key/value persistence with crash-durable writes
//! - Namespaced cache entries with per-entry expiry
//! - Lazy eviction on read, optional explicit sweep
//!
//! ## Architecture
//!
//! This crate provides the `IDurableStore` adapter from `fieldsync-core`
//! using SQLite as the storage backend (a driven adapter in the hexagonal
//! architecture), and the [`CacheEngine`], which wraps *any* durable store
//! with the freshness and namespacing rules.
//!
//! ## Key Components
//!
//! - [`SqliteDurableStore`] - `IDurableStore` implementation, owns the
//!   connection pool and schema
//! - [`CacheEngine`] - TTL cache over a durable store
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use fieldsync_cache::{CacheEngine, SqliteDurableStore};
//! use fieldsync_core::config::CacheConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(
//!     SqliteDurableStore::open(Path::new("/home/user/.local/share/fieldsync/state.db")).await?,
//! );
//! let cache = CacheEngine::new(store, &CacheConfig::default())?;
//! cache.set_item("profile", &serde_json::json!({"name": "Ana"})).await;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod store;

pub use engine::CacheEngine;
pub use store::SqliteDurableStore;

/// Errors that can occur during cache persistence operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
