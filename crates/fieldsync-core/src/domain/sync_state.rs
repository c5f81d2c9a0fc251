//! Sync state machine types
//!
//! The sync engine moves through `Idle → Syncing → {Success, Error}`.
//! `Success` and `Error` are observable resting states; a new trigger may
//! start the next cycle from either of them. The `Syncing` state doubles
//! as the mutual-exclusion marker: at most one drain is in flight per
//! engine at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the sync engine currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No sync has run yet in this process
    Idle,
    /// A drain is in flight
    Syncing,
    /// The last drain applied every snapshotted change
    Success,
    /// The last drain stopped at a failed change
    Error,
}

impl SyncStatus {
    /// Stable lowercase name, used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }

    /// Whether a new sync may be started from this status
    #[must_use]
    pub fn can_start(&self) -> bool {
        !matches!(self, SyncStatus::Syncing)
    }
}

/// Snapshot of the sync engine's observable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    /// Current position in the sync cycle
    pub status: SyncStatus,
    /// When the last fully successful drain completed; survives restarts
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Number of changes still waiting in the queue
    pub pending_count: usize,
    /// Reason the last drain stopped, if it stopped on a failure
    pub last_error: Option<String>,
}

impl SyncState {
    /// Initial state for a fresh engine with a possibly restored sync time
    #[must_use]
    pub fn new(last_sync_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status: SyncStatus::Idle,
            last_sync_at,
            pending_count: 0,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_syncing_blocks_a_new_cycle() {
        assert!(SyncStatus::Idle.can_start());
        assert!(SyncStatus::Success.can_start());
        assert!(SyncStatus::Error.can_start());
        assert!(!SyncStatus::Syncing.can_start());
    }

    #[test]
    fn test_initial_state() {
        let state = SyncState::new(None);
        assert_eq!(state.status, SyncStatus::Idle);
        assert!(state.last_sync_at.is_none());
        assert_eq!(state.pending_count, 0);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_status_names() {
        assert_eq!(SyncStatus::Syncing.name(), "syncing");
        assert_eq!(SyncStatus::Error.name(), "error");
    }
}
