//! Permission capability and status types
//!
//! Platform capabilities the application may need (camera for evidence
//! photos, location for site check-ins, and so on) and the small status
//! enum the permission tracker maintains for each. Records are never
//! persisted; they are re-derived from the platform on every process
//! start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform capability the application can hold a permission for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Camera,
    PhotoLibrary,
    Location,
    Notification,
    Microphone,
    Storage,
}

impl Capability {
    /// All capabilities, in the order the tracker seeds them
    pub const ALL: [Capability; 6] = [
        Capability::Camera,
        Capability::PhotoLibrary,
        Capability::Location,
        Capability::Notification,
        Capability::Microphone,
        Capability::Storage,
    ];

    /// Stable lowercase name, used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Camera => "camera",
            Capability::PhotoLibrary => "photo_library",
            Capability::Location => "location",
            Capability::Notification => "notification",
            Capability::Microphone => "microphone",
            Capability::Storage => "storage",
        }
    }
}

/// Outcome of a platform permission check or request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// The user granted full access
    Granted,
    /// The user declined, but may be prompted again
    Denied,
    /// The user declined permanently; only the system settings can undo this
    Blocked,
    /// The capability does not exist on this device
    Unavailable,
    /// Partial access was granted (e.g. selected photos only)
    Limited,
    /// Not yet determined, or the platform query failed
    Unknown,
}

impl PermissionStatus {
    /// Whether this status lets the application use the capability
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, PermissionStatus::Granted | PermissionStatus::Limited)
    }

    /// Whether prompting the user again can change this status
    ///
    /// `Blocked` requires a trip to the system settings and `Unavailable`
    /// can never change, so re-prompting is pointless for both. `Granted`
    /// needs no prompt.
    #[must_use]
    pub fn is_promptable(&self) -> bool {
        matches!(
            self,
            PermissionStatus::Denied | PermissionStatus::Unknown | PermissionStatus::Limited
        )
    }
}

/// The tracker's in-memory record for one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Which capability this record describes
    pub capability: Capability,
    /// Last observed status
    pub status: PermissionStatus,
    /// When the status was last refreshed from the platform
    pub checked_at: Option<DateTime<Utc>>,
}

impl PermissionRecord {
    /// Initial record before the platform has been queried
    #[must_use]
    pub fn unknown(capability: Capability) -> Self {
        Self {
            capability,
            status: PermissionStatus::Unknown,
            checked_at: None,
        }
    }

    /// Record a freshly observed status
    #[must_use]
    pub fn observed(capability: Capability, status: PermissionStatus) -> Self {
        Self {
            capability,
            status,
            checked_at: Some(Utc::now()),
        }
    }
}
