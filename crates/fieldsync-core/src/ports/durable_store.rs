//! Durable store port (driven/secondary port)
//!
//! This module defines the interface for the process-wide persistent
//! key/value store that the cache engine, the pending-change queue, and
//! the sync engine's bookkeeping all sit on top of.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (SQLite, flat files, platform storage) and don't need domain-level
//!   classification. Callers decide whether a failure degrades (cache) or
//!   propagates (queue).
//! - Writes must be committed before the call returns; the queue relies
//!   on this so a crash after a local mutation never drops the obligation
//!   to sync it.
//! - No cross-key atomicity is promised. `delete_many` is a convenience,
//!   not a transaction guarantee.

use async_trait::async_trait;

/// Port trait for crash-durable key/value persistence
///
/// Keys are flat strings; consumers partition the space with
/// [`Namespace`](crate::domain::Namespace) prefixes. Values are opaque
/// byte blobs; any serialization is the consumer's concern.
#[async_trait]
pub trait IDurableStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any previous value
    ///
    /// The write is committed before this returns.
    async fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Deletes the value under `key`; succeeds if the key is absent
    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Lists all keys starting with `prefix`, in lexicographic order
    async fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>>;

    /// Deletes every key in `keys`; absent keys are ignored
    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<()>;
}
