//! FieldSync Permissions - Runtime permission tracking
//!
//! Keeps an in-memory map of the last observed status for every platform
//! capability the application uses, and funnels all checks and prompts
//! through the [`IPermissionPlatform`](fieldsync_core::ports::IPermissionPlatform)
//! port. Statuses are never persisted; they are re-derived from the
//! platform at startup because the user can change them in the system
//! settings at any time.

pub mod tracker;

pub use tracker::PermissionTracker;
