//! In-memory permission tracker
//!
//! The tracker is the single owner of permission state. It caches the
//! last observed status per capability and decides when a platform prompt
//! is worth showing at all: capabilities that are already granted, or
//! permanently blocked, are never re-prompted.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use fieldsync_core::domain::{Capability, PermissionRecord, PermissionStatus};
use fieldsync_core::ports::IPermissionPlatform;

/// Tracks the observed permission status of every capability
///
/// Cheap to share: all state lives in a concurrent map. Platform errors
/// degrade to [`PermissionStatus::Unknown`] rather than propagating, so a
/// broken permission API never takes the application down.
pub struct PermissionTracker {
    platform: Arc<dyn IPermissionPlatform>,
    records: DashMap<Capability, PermissionRecord>,
}

impl PermissionTracker {
    /// Creates a tracker with every capability in the unknown state
    pub fn new(platform: Arc<dyn IPermissionPlatform>) -> Self {
        let records = DashMap::new();
        for capability in Capability::ALL {
            records.insert(capability, PermissionRecord::unknown(capability));
        }
        Self { platform, records }
    }

    /// Refreshes every capability from the platform
    ///
    /// Called once at startup; individual query failures are logged and
    /// leave that capability unknown.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) {
        for capability in Capability::ALL {
            self.check_permission(capability).await;
        }
        info!("Permission tracker initialized");
    }

    /// Queries the platform for the current status without prompting
    ///
    /// The observed status replaces the cached record. A platform error
    /// degrades to [`PermissionStatus::Unknown`].
    pub async fn check_permission(&self, capability: Capability) -> PermissionStatus {
        let status = match self.platform.check(capability).await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    capability = capability.name(),
                    error = %e,
                    "Permission check failed"
                );
                PermissionStatus::Unknown
            }
        };

        debug!(
            capability = capability.name(),
            status = ?status,
            "Permission checked"
        );
        self.records
            .insert(capability, PermissionRecord::observed(capability, status));
        status
    }

    /// Requests a capability, prompting the user only when it can help
    ///
    /// A fresh check runs first. If the result is already granted, or is
    /// blocked or unavailable, the platform prompt is skipped and that
    /// status is returned as-is; prompting cannot change it. Otherwise the
    /// platform prompt is shown and the user's answer becomes the new
    /// cached status.
    #[tracing::instrument(skip(self), fields(capability = capability.name()))]
    pub async fn request_permission(&self, capability: Capability) -> PermissionStatus {
        let current = self.check_permission(capability).await;
        if !current.is_promptable() {
            debug!(status = ?current, "Prompt skipped, status cannot improve");
            return current;
        }

        let status = match self.platform.request(capability).await {
            Ok(status) => status,
            Err(e) => {
                warn!(
                    capability = capability.name(),
                    error = %e,
                    "Permission request failed"
                );
                PermissionStatus::Unknown
            }
        };

        info!(
            capability = capability.name(),
            status = ?status,
            "Permission requested"
        );
        self.records
            .insert(capability, PermissionRecord::observed(capability, status));
        status
    }

    /// Whether the cached status lets the application use the capability
    ///
    /// Reads the cache only; call [`check_permission`](Self::check_permission)
    /// first when staleness matters.
    pub fn has_permission(&self, capability: Capability) -> bool {
        self.records
            .get(&capability)
            .map(|r| r.status.is_usable())
            .unwrap_or(false)
    }

    /// Snapshot of every capability's record, in [`Capability::ALL`] order
    pub fn permissions(&self) -> Vec<PermissionRecord> {
        Capability::ALL
            .iter()
            .filter_map(|c| self.records.get(c).map(|r| *r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Platform fake with per-capability scripted statuses and a prompt
    /// call counter
    struct FakePlatform {
        check_status: Mutex<HashMap<Capability, PermissionStatus>>,
        request_status: PermissionStatus,
        request_calls: AtomicUsize,
        check_fails: bool,
    }

    impl FakePlatform {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                check_status: Mutex::new(HashMap::new()),
                request_status: PermissionStatus::Granted,
                request_calls: AtomicUsize::new(0),
                check_fails: false,
            })
        }

        fn with_status(capability: Capability, status: PermissionStatus) -> Arc<Self> {
            let platform = Self::new();
            platform
                .check_status
                .lock()
                .unwrap()
                .insert(capability, status);
            platform
        }

        fn request_calls(&self) -> usize {
            self.request_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IPermissionPlatform for FakePlatform {
        async fn check(&self, capability: Capability) -> anyhow::Result<PermissionStatus> {
            if self.check_fails {
                anyhow::bail!("platform unavailable");
            }
            Ok(self
                .check_status
                .lock()
                .unwrap()
                .get(&capability)
                .copied()
                .unwrap_or(PermissionStatus::Denied))
        }

        async fn request(&self, _capability: Capability) -> anyhow::Result<PermissionStatus> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.request_status)
        }
    }

    #[tokio::test]
    async fn test_starts_unknown_until_initialized() {
        let tracker = PermissionTracker::new(FakePlatform::new());

        assert!(!tracker.has_permission(Capability::Camera));
        let records = tracker.permissions();
        assert_eq!(records.len(), Capability::ALL.len());
        assert!(records
            .iter()
            .all(|r| r.status == PermissionStatus::Unknown && r.checked_at.is_none()));
    }

    #[tokio::test]
    async fn test_initialize_seeds_every_capability() {
        let platform =
            FakePlatform::with_status(Capability::Camera, PermissionStatus::Granted);
        let tracker = PermissionTracker::new(platform);

        tracker.initialize().await;

        let records = tracker.permissions();
        assert!(records.iter().all(|r| r.checked_at.is_some()));
        assert!(tracker.has_permission(Capability::Camera));
        assert!(!tracker.has_permission(Capability::Location));
    }

    #[tokio::test]
    async fn test_granted_capability_is_never_reprompted() {
        let platform =
            FakePlatform::with_status(Capability::Camera, PermissionStatus::Granted);
        let tracker = PermissionTracker::new(platform.clone());

        let status = tracker.request_permission(Capability::Camera).await;

        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(platform.request_calls(), 0);
    }

    #[tokio::test]
    async fn test_blocked_capability_is_never_reprompted() {
        let platform =
            FakePlatform::with_status(Capability::Location, PermissionStatus::Blocked);
        let tracker = PermissionTracker::new(platform.clone());

        let status = tracker.request_permission(Capability::Location).await;

        assert_eq!(status, PermissionStatus::Blocked);
        assert_eq!(platform.request_calls(), 0);
        assert!(!tracker.has_permission(Capability::Location));
    }

    #[tokio::test]
    async fn test_denied_capability_prompts_and_caches_the_answer() {
        let platform =
            FakePlatform::with_status(Capability::Microphone, PermissionStatus::Denied);
        let tracker = PermissionTracker::new(platform.clone());

        let status = tracker.request_permission(Capability::Microphone).await;

        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(platform.request_calls(), 1);
        assert!(tracker.has_permission(Capability::Microphone));
    }

    #[tokio::test]
    async fn test_platform_failure_degrades_to_unknown() {
        let platform = Arc::new(FakePlatform {
            check_status: Mutex::new(HashMap::new()),
            request_status: PermissionStatus::Granted,
            request_calls: AtomicUsize::new(0),
            check_fails: true,
        });
        let tracker = PermissionTracker::new(platform);

        let status = tracker.check_permission(Capability::Storage).await;

        assert_eq!(status, PermissionStatus::Unknown);
        assert!(!tracker.has_permission(Capability::Storage));
        // The failed check is still an observation.
        let record = tracker
            .permissions()
            .into_iter()
            .find(|r| r.capability == Capability::Storage)
            .unwrap();
        assert!(record.checked_at.is_some());
    }

    #[tokio::test]
    async fn test_limited_status_is_usable_and_still_promptable() {
        let platform =
            FakePlatform::with_status(Capability::PhotoLibrary, PermissionStatus::Limited);
        let tracker = PermissionTracker::new(platform.clone());

        tracker.check_permission(Capability::PhotoLibrary).await;
        assert!(tracker.has_permission(Capability::PhotoLibrary));

        // Limited access can be upgraded, so the prompt is allowed.
        let status = tracker.request_permission(Capability::PhotoLibrary).await;
        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(platform.request_calls(), 1);
    }
}
