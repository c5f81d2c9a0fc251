//! Platform permission port (driven/secondary port)
//!
//! This module defines the interface to the operating system's permission
//! machinery. The permission tracker delegates every check and prompt to
//! an implementation of this trait and only keeps the resulting statuses
//! in memory.
//!
//! ## Design Notes
//!
//! - `check` must never present UI to the user; it is a passive query.
//! - `request` may present the platform prompt and resolves once the user
//!   answers (or immediately, if the platform already knows the answer).
//! - Errors are adapter-specific and degrade to
//!   [`PermissionStatus::Unknown`](crate::domain::PermissionStatus) in the
//!   tracker; they are never fatal.

use async_trait::async_trait;

use crate::domain::{Capability, PermissionStatus};

/// Port trait for the platform permission API
#[async_trait]
pub trait IPermissionPlatform: Send + Sync {
    /// Queries the current status of a capability without prompting
    async fn check(&self, capability: Capability) -> anyhow::Result<PermissionStatus>;

    /// Prompts the user for a capability and returns the resulting status
    async fn request(&self, capability: Capability) -> anyhow::Result<PermissionStatus>;
}
