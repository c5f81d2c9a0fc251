//! Domain entities and business logic
//!
//! This module contains the core domain types for FieldSync:
//! - Newtypes for type-safe identifiers and validated domain values
//! - Cache envelope with TTL freshness rules
//! - Pending change records awaiting remote application
//! - Sync state machine types
//! - Permission capability/status types
//! - Domain-specific error types

pub mod change;
pub mod entry;
pub mod errors;
pub mod newtypes;
pub mod permission;
pub mod sync_state;

// Re-export commonly used types
pub use change::{ChangeOperation, PendingChange};
pub use entry::CacheEnvelope;
pub use errors::DomainError;
pub use newtypes::{ChangeId, Namespace};
pub use permission::{Capability, PermissionRecord, PermissionStatus};
pub use sync_state::{SyncState, SyncStatus};
