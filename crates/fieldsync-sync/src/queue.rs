//! Durable pending-change queue
//!
//! Each queued change is stored as its own record under the queue
//! namespace, keyed by a zero-padded monotone sequence number so that
//! lexicographic key order equals replay order. Storing records
//! individually (rather than one serialized list) is what makes
//! per-change removal during a drain cheap and crash-safe: a crash
//! mid-drain loses nothing, because only confirmed changes have been
//! deleted.
//!
//! The sequence counter is seeded from the highest existing record at
//! open time, so ordering survives process restarts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fieldsync_core::domain::{ChangeId, Namespace, PendingChange};
use fieldsync_core::ports::IDurableStore;

/// Stored form of a queued change
#[derive(Debug, Serialize, Deserialize)]
struct QueueRecord {
    seq: u64,
    change: PendingChange,
}

/// Durable FIFO queue of changes awaiting remote application
///
/// Safe to share across tasks: `enqueue` may run concurrently with an
/// in-flight drain. A drain works from a [`list_all`](PendingQueue::list_all)
/// snapshot, so changes enqueued during the drain are simply picked up by
/// the next one.
pub struct PendingQueue {
    store: Arc<dyn IDurableStore>,
    namespace: Namespace,
    next_seq: AtomicU64,
}

impl PendingQueue {
    /// Opens the queue over a durable store, seeding the sequence counter
    /// from existing records
    ///
    /// Corrupt records found during the scan can never be replayed, so
    /// they are logged and deleted here. This is the only place the queue
    /// discards anything that was not confirmed remotely.
    ///
    /// # Errors
    ///
    /// Fails if the namespace is malformed or the store cannot be read.
    pub async fn open(store: Arc<dyn IDurableStore>, namespace: &str) -> anyhow::Result<Self> {
        let namespace = Namespace::new(namespace)?;

        let keys = store
            .list_keys(namespace.as_str())
            .await
            .context("Failed to scan pending-change queue")?;

        let mut max_seq = 0u64;
        let mut corrupt = Vec::new();
        for key in &keys {
            match Self::parse_record(&store, key).await {
                Some(record) => max_seq = max_seq.max(record.seq),
                None => corrupt.push(key.clone()),
            }
        }

        if !corrupt.is_empty() {
            warn!(
                count = corrupt.len(),
                "Dropping unreadable pending-change records"
            );
            store
                .delete_many(&corrupt)
                .await
                .context("Failed to drop corrupt queue records")?;
        }

        debug!(
            records = keys.len() - corrupt.len(),
            next_seq = max_seq + 1,
            "Pending-change queue opened"
        );

        Ok(Self {
            store,
            namespace,
            next_seq: AtomicU64::new(max_seq + 1),
        })
    }

    /// Appends a change; the record is durable before this returns
    ///
    /// Unlike cache writes, failures here propagate: losing the record
    /// would silently drop the obligation to sync the local mutation.
    pub async fn enqueue(&self, change: PendingChange) -> anyhow::Result<ChangeId> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let id = *change.id();
        let record = QueueRecord { seq, change };

        let bytes =
            serde_json::to_vec(&record).context("Failed to serialize pending change")?;
        let key = self.key_for(seq);
        self.store
            .set(&key, &bytes)
            .await
            .context("Failed to persist pending change")?;

        debug!(change_id = %id, seq, "Enqueued pending change");
        Ok(id)
    }

    /// Snapshot of all queued changes in replay (FIFO) order
    ///
    /// Read-only: does not mutate queue state. Records that fail to parse
    /// are logged and skipped.
    pub async fn list_all(&self) -> anyhow::Result<Vec<PendingChange>> {
        let keys = self
            .store
            .list_keys(self.namespace.as_str())
            .await
            .context("Failed to list pending-change queue")?;

        let mut records = Vec::with_capacity(keys.len());
        for key in &keys {
            match Self::parse_record(&self.store, key).await {
                Some(record) => records.push(record),
                None => warn!(key, "Skipping unreadable pending-change record"),
            }
        }

        // Keys are zero-padded so this is already the scan order; sorting
        // by the stored sequence guards against a store that returns keys
        // unordered.
        records.sort_by_key(|r| r.seq);
        Ok(records.into_iter().map(|r| r.change).collect())
    }

    /// Removes the record for `id` after its remote application was
    /// confirmed; idempotent
    pub async fn remove_by_id(&self, id: &ChangeId) -> anyhow::Result<()> {
        let keys = self
            .store
            .list_keys(self.namespace.as_str())
            .await
            .context("Failed to list pending-change queue")?;

        for key in &keys {
            if let Some(record) = Self::parse_record(&self.store, key).await {
                if record.change.id() == id {
                    self.store
                        .delete(key)
                        .await
                        .context("Failed to remove applied change")?;
                    debug!(change_id = %id, seq = record.seq, "Removed applied change");
                    return Ok(());
                }
            }
        }

        debug!(change_id = %id, "Change already removed");
        Ok(())
    }

    /// Number of replayable changes
    ///
    /// Counts through the same parse path as [`list_all`](Self::list_all),
    /// so an unreadable record does not inflate the count.
    pub async fn size(&self) -> anyhow::Result<usize> {
        Ok(self.list_all().await?.len())
    }

    fn key_for(&self, seq: u64) -> String {
        self.namespace.key(&format!("{seq:020}"))
    }

    async fn parse_record(store: &Arc<dyn IDurableStore>, key: &str) -> Option<QueueRecord> {
        let bytes = store.get(key).await.ok().flatten()?;
        serde_json::from_slice(&bytes).ok()
    }
}
