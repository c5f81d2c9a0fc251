//! Offline sync engine
//!
//! The [`SyncEngine`] observes a connectivity signal and drains the
//! pending-change queue against the remote store when it can. It moves
//! through `Idle → Syncing → {Success, Error}`; the terminal states are
//! observable and any trigger may start the next cycle from them.
//!
//! ## Triggers
//!
//! 1. **Connectivity restored** - the run loop reacts to false→true edges
//!    of the watch channel and drains if the queue is non-empty.
//! 2. **Explicit** - [`sync_now`](SyncEngine::sync_now), the "sync now"
//!    button.
//! 3. **Periodic** - an optional timer in the run loop, for installations
//!    that want background catch-up without waiting for an edge.
//!
//! All three funnel into the same single-flight drain: a trigger that
//! arrives while a drain is in flight is a no-op.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use fieldsync_core::config::SyncConfig;
use fieldsync_core::domain::{Namespace, PendingChange, SyncState, SyncStatus};
use fieldsync_core::ports::{IDurableStore, IRemoteStore};

use crate::queue::PendingQueue;

/// Logical key (within the meta namespace) for the persisted sync time
const LAST_SYNC_KEY: &str = "last_sync_at";

/// Drains the pending-change queue against the remote store
///
/// At most one drain is in flight per engine; concurrent triggers are
/// rejected, never run in parallel. Construct with
/// [`open`](SyncEngine::open) so the last sync time is restored from the
/// durable store.
pub struct SyncEngine {
    remote: Arc<dyn IRemoteStore>,
    store: Arc<dyn IDurableStore>,
    queue: Arc<PendingQueue>,
    connectivity: watch::Receiver<bool>,
    meta_namespace: Namespace,
    /// Periodic trigger interval; `None` disables the timer
    auto_sync_interval: Option<Duration>,
    /// Observable state; never held across a drain
    state: RwLock<SyncState>,
    /// Single-flight gate: `try_lock` failure means a drain is in flight
    drain_gate: Mutex<()>,
}

impl SyncEngine {
    /// Opens the engine, restoring the last sync time from the store
    ///
    /// # Errors
    ///
    /// Fails only on a malformed meta namespace; an unreadable persisted
    /// sync time is logged and treated as "never synced".
    pub async fn open(
        remote: Arc<dyn IRemoteStore>,
        store: Arc<dyn IDurableStore>,
        queue: Arc<PendingQueue>,
        connectivity: watch::Receiver<bool>,
        config: &SyncConfig,
    ) -> anyhow::Result<Self> {
        let meta_namespace = Namespace::new(config.meta_namespace.clone())?;
        let last_sync_at = Self::load_last_sync(&store, &meta_namespace).await;

        Ok(Self {
            remote,
            store,
            queue,
            connectivity,
            meta_namespace,
            auto_sync_interval: config
                .auto_sync
                .then(|| Duration::from_secs(config.sync_interval_secs)),
            state: RwLock::new(SyncState::new(last_sync_at)),
            drain_gate: Mutex::new(()),
        })
    }

    /// Attempts one sync cycle; returns whether a full drain succeeded
    ///
    /// Returns `false` immediately when offline or when another drain is
    /// already in flight (the at-most-one-sync rule). A partial drain also
    /// returns `false` and leaves the failed change, and everything queued
    /// after it, in place for the next trigger.
    #[tracing::instrument(skip(self))]
    pub async fn sync_now(&self) -> bool {
        if !*self.connectivity.borrow() {
            debug!("Sync requested while offline, skipping");
            return false;
        }

        let Ok(_guard) = self.drain_gate.try_lock() else {
            debug!("Sync already in flight, trigger ignored");
            return false;
        };

        self.transition(SyncStatus::Syncing, None).await;

        match self.drain().await {
            Ok(applied) => {
                let now = Utc::now();
                self.persist_last_sync(now).await;
                {
                    let mut state = self.state.write().await;
                    state.status = SyncStatus::Success;
                    state.last_sync_at = Some(now);
                    state.last_error = None;
                }
                info!(applied, "Sync completed");
                true
            }
            Err(reason) => {
                warn!(reason = %reason, "Sync stopped before draining the queue");
                self.transition(SyncStatus::Error, Some(reason)).await;
                false
            }
        }
    }

    /// Event loop: reacts to connectivity edges and the optional timer
    ///
    /// Only false→true transitions trigger a drain, and only when the
    /// queue is non-empty. Returns when the connectivity sender is
    /// dropped.
    pub async fn run(&self) {
        info!(
            auto_sync = self.auto_sync_interval.is_some(),
            "Sync engine starting"
        );

        let mut rx = self.connectivity.clone();
        let mut reachable = *rx.borrow();
        // Start the timer one full period out so the loop does not sync
        // immediately at startup.
        let mut ticker = self.auto_sync_interval.map(|period| {
            tokio::time::interval_at(tokio::time::Instant::now() + period, period)
        });

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        info!("Connectivity signal closed, sync engine stopping");
                        break;
                    }
                    let now_reachable = *rx.borrow_and_update();
                    if !reachable && now_reachable {
                        info!("Connectivity restored");
                        if self.has_pending_changes().await {
                            self.sync_now().await;
                        } else {
                            debug!("Queue empty, nothing to drain");
                        }
                    }
                    reachable = now_reachable;
                }

                _ = tick(&mut ticker) => {
                    if reachable && self.has_pending_changes().await {
                        debug!("Periodic sync tick");
                        self.sync_now().await;
                    }
                }
            }
        }
    }

    /// Observable state snapshot with a freshly derived pending count
    pub async fn state(&self) -> SyncState {
        let mut state = self.state.read().await.clone();
        state.pending_count = self.queue.size().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to count pending changes");
            0
        });
        state
    }

    /// Current position in the sync cycle
    pub async fn status(&self) -> SyncStatus {
        self.state.read().await.status
    }

    /// When the last fully successful drain completed
    pub async fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_sync_at
    }

    /// Snapshot of the queued changes in replay order
    pub async fn pending_changes(&self) -> Vec<PendingChange> {
        self.queue.list_all().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list pending changes");
            Vec::new()
        })
    }

    /// Whether any changes are waiting to be synced
    pub async fn has_pending_changes(&self) -> bool {
        self.queue.size().await.map(|n| n > 0).unwrap_or(false)
    }

    /// Applies the snapshotted queue in order; returns how many changes
    /// were applied
    ///
    /// Stops at the first failure so dependent changes are never replayed
    /// out of order. Each confirmed change is removed from the queue
    /// immediately, so a later failure cannot re-apply it.
    async fn drain(&self) -> Result<usize, String> {
        let snapshot = self
            .queue
            .list_all()
            .await
            .map_err(|e| format!("queue snapshot failed: {e:#}"))?;

        let total = snapshot.len();
        debug!(total, "Draining pending-change queue");

        for (index, change) in snapshot.iter().enumerate() {
            if let Err(e) = self.remote.apply(change).await {
                warn!(
                    change_id = %change.id(),
                    resource = change.resource(),
                    operation = change.operation().name(),
                    error = %e,
                    "Remote apply failed, leaving remaining changes queued"
                );
                return Err(format!(
                    "apply failed for {} ({}): {e:#}",
                    change.id(),
                    change.resource()
                ));
            }

            self.queue
                .remove_by_id(change.id())
                .await
                .map_err(|e| format!("failed to retire applied change: {e:#}"))?;

            debug!(
                change_id = %change.id(),
                progress = format!("{}/{}", index + 1, total),
                "Change applied remotely"
            );
        }

        Ok(total)
    }

    async fn transition(&self, status: SyncStatus, error: Option<String>) {
        let mut state = self.state.write().await;
        state.status = status;
        state.last_error = error;
    }

    /// Best-effort persistence of the sync time; the in-memory state is
    /// authoritative for this process either way
    async fn persist_last_sync(&self, at: DateTime<Utc>) {
        let key = self.meta_namespace.key(LAST_SYNC_KEY);
        if let Err(e) = self.store.set(&key, at.to_rfc3339().as_bytes()).await {
            warn!(error = %e, "Failed to persist last sync time");
        }
    }

    async fn load_last_sync(
        store: &Arc<dyn IDurableStore>,
        namespace: &Namespace,
    ) -> Option<DateTime<Utc>> {
        let key = namespace.key(LAST_SYNC_KEY);
        let bytes = match store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted sync time");
                return None;
            }
        };

        let text = String::from_utf8(bytes).ok()?;
        match DateTime::parse_from_rfc3339(&text) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                warn!(error = %e, "Unreadable persisted sync time, ignoring");
                None
            }
        }
    }
}

/// Awaits the next periodic tick, or forever when the timer is disabled
async fn tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
