//! Remote store port (driven/secondary port)
//!
//! This module defines the interface the sync engine drains the
//! pending-change queue against. The production implementation is the
//! application's API client; this core never speaks HTTP itself.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because failure reasons are adapter-specific
//!   (HTTP status, transport error, validation message). The engine only
//!   needs success-or-reason.
//! - The engine retries a failed change on the *next* trigger, so a
//!   change that timed out after the server committed it will be applied
//!   again. Implementations are therefore required to make `apply`
//!   idempotent per [`ChangeId`](crate::domain::ChangeId), e.g. via an
//!   idempotency key header. The engine cannot enforce this.
//! - Conflict policy between devices is last-queued-wins: whatever change
//!   reaches the remote last overwrites earlier state, with no merge.

use async_trait::async_trait;

use crate::domain::PendingChange;

/// Port trait for applying local mutations to the remote service
#[async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Applies one pending change remotely
    ///
    /// Returns `Ok(())` only once the remote service has durably accepted
    /// the mutation. Any error leaves the change (and everything queued
    /// after it) eligible for replay on the next sync trigger.
    ///
    /// Implementations must tolerate a repeated `apply` of the same
    /// change id without duplicating its effect.
    async fn apply(&self, change: &PendingChange) -> anyhow::Result<()>;
}
