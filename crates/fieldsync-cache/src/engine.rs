//! TTL cache engine over a durable store
//!
//! The [`CacheEngine`] gives the application a typed get/set cache with
//! per-entry expiry on top of the opaque [`IDurableStore`] port. It owns
//! the cache namespace within the store and the degradation policy: no
//! storage or serialization failure ever reaches the caller. A failed
//! write means the value simply is not cached; a failed or corrupt read
//! is a miss.
//!
//! Eviction is lazy: an expired entry is removed by the read that finds
//! it. [`evict_expired`](CacheEngine::evict_expired) offers an explicit
//! sweep for callers that want to reclaim space eagerly.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use fieldsync_core::config::CacheConfig;
use fieldsync_core::domain::{CacheEnvelope, DomainError, Namespace};
use fieldsync_core::ports::IDurableStore;

/// Namespaced TTL cache over a durable key/value store
///
/// Concurrent `set_item`/`get_item` on the same key are serialized by the
/// underlying store; last write wins. There is no cross-key atomicity.
pub struct CacheEngine {
    store: Arc<dyn IDurableStore>,
    namespace: Namespace,
    default_ttl: Option<Duration>,
    max_size_bytes: u64,
}

impl CacheEngine {
    /// Creates a cache engine from configuration
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidNamespace` if the configured cache
    /// namespace is malformed.
    pub fn new(store: Arc<dyn IDurableStore>, config: &CacheConfig) -> Result<Self, DomainError> {
        Ok(Self {
            store,
            namespace: Namespace::new(config.namespace.clone())?,
            default_ttl: config.default_ttl_secs.map(Duration::from_secs),
            max_size_bytes: config.max_size_bytes,
        })
    }

    /// Writes a value under `key` with the configured default TTL
    ///
    /// Storage and serialization failures are logged and swallowed; the
    /// caller proceeds as if the value were simply not cached.
    #[tracing::instrument(skip(self, value))]
    pub async fn set_item<T: Serialize>(&self, key: &str, value: &T) {
        self.set_item_with_ttl(key, value, self.default_ttl).await;
    }

    /// Writes a value under `key` with an explicit TTL
    ///
    /// `None` means the entry never expires, regardless of the configured
    /// default.
    #[tracing::instrument(skip(self, value))]
    pub async fn set_item_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) {
        let payload = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache value, skipping write");
                return;
            }
        };

        let envelope = CacheEnvelope::new(payload, ttl);
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(b) => b,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cache envelope, skipping write");
                return;
            }
        };

        self.enforce_budget(bytes.len() as u64).await;

        let full_key = self.namespace.key(key);
        if let Err(e) = self.store.set(&full_key, &bytes).await {
            warn!(key, error = %e, "Cache write failed, value will not be cached");
        }
    }

    /// Reads the value under `key`, or `None` if absent, expired, or corrupt
    ///
    /// Never returns a value past its TTL. An expired entry is deleted by
    /// this read (lazy eviction).
    #[tracing::instrument(skip(self))]
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let envelope = self.read_envelope(key).await?;

        if !envelope.is_fresh() {
            debug!(key, "Cache entry expired, evicting");
            self.remove_item(key).await;
            return None;
        }

        match serde_json::from_value(envelope.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Cached payload does not match requested type");
                None
            }
        }
    }

    /// Deletes the entry under `key`; idempotent
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, key: &str) {
        let full_key = self.namespace.key(key);
        if let Err(e) = self.store.delete(&full_key).await {
            warn!(key, error = %e, "Cache delete failed");
        }
    }

    /// Deletes every entry under the cache namespace
    ///
    /// Keys outside the namespace (queue records, sync bookkeeping) are
    /// untouched.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cache(&self) {
        let keys = match self.store.list_keys(self.namespace.as_str()).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys, clear skipped");
                return;
            }
        };

        if keys.is_empty() {
            return;
        }

        match self.store.delete_many(&keys).await {
            Ok(()) => info!(count = keys.len(), "Cache cleared"),
            Err(e) => warn!(error = %e, "Failed to clear cache"),
        }
    }

    /// Pure freshness predicate: no eviction, no side effects
    ///
    /// Absent and corrupt entries count as expired.
    pub async fn is_expired(&self, key: &str) -> bool {
        match self.read_envelope(key).await {
            Some(envelope) => !envelope.is_fresh(),
            None => true,
        }
    }

    /// Logical keys currently stored under the cache namespace
    ///
    /// Includes expired entries that have not been evicted yet.
    pub async fn cache_keys(&self) -> Vec<String> {
        match self.store.list_keys(self.namespace.as_str()).await {
            Ok(keys) => keys
                .iter()
                .filter_map(|k| self.namespace.strip(k))
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys");
                Vec::new()
            }
        }
    }

    /// Total bytes stored under the cache namespace
    pub async fn cache_size(&self) -> u64 {
        let keys = match self.store.list_keys(self.namespace.as_str()).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys for size accounting");
                return 0;
            }
        };

        let mut total = 0u64;
        for key in &keys {
            if let Ok(Some(bytes)) = self.store.get(key).await {
                total += bytes.len() as u64;
            }
        }
        total
    }

    /// Removes every expired entry and returns how many were evicted
    ///
    /// The lazy read-path eviction makes this optional; it exists for
    /// callers that want to reclaim space without waiting for reads.
    #[tracing::instrument(skip(self))]
    pub async fn evict_expired(&self) -> usize {
        let keys = match self.store.list_keys(self.namespace.as_str()).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache keys for sweep");
                return 0;
            }
        };

        let mut expired = Vec::new();
        for full_key in keys {
            let bytes = match self.store.get(&full_key).await {
                Ok(Some(bytes)) => bytes,
                _ => continue,
            };
            match serde_json::from_slice::<CacheEnvelope>(&bytes) {
                Ok(envelope) if envelope.is_fresh() => {}
                // Corrupt entries are reclaimed by the sweep too.
                _ => expired.push(full_key),
            }
        }

        if expired.is_empty() {
            return 0;
        }

        match self.store.delete_many(&expired).await {
            Ok(()) => {
                debug!(count = expired.len(), "Swept expired cache entries");
                expired.len()
            }
            Err(e) => {
                warn!(error = %e, "Failed to sweep expired cache entries");
                0
            }
        }
    }

    /// Reads and parses the envelope under `key`
    ///
    /// Absent, unreadable, and corrupt entries all map to `None`; a parse
    /// failure is a cache miss, never an error.
    async fn read_envelope(&self, key: &str) -> Option<CacheEnvelope> {
        let full_key = self.namespace.key(key);
        let bytes = match self.store.get(&full_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(key, error = %e, "Corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Clears the namespace when an incoming write would exceed the budget
    ///
    /// Mirrors the application's historical policy: no LRU, just a full
    /// reset once the budget is hit.
    async fn enforce_budget(&self, incoming_bytes: u64) {
        if self.max_size_bytes == 0 {
            return;
        }

        let current = self.cache_size().await;
        if current + incoming_bytes > self.max_size_bytes {
            info!(
                current,
                incoming_bytes,
                budget = self.max_size_bytes,
                "Cache budget exceeded, clearing namespace"
            );
            self.clear_cache().await;
        }
    }
}
