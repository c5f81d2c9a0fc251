//! FieldSync Sync - Offline synchronization engine
//!
//! Provides:
//! - A durable FIFO queue of local mutations awaiting remote application
//! - A sync engine that drains the queue when connectivity returns or on
//!   explicit/periodic triggers
//! - Crash-safe bookkeeping (queue records and last-sync time survive
//!   process restarts)
//!
//! ## Modules
//!
//! - [`queue`] - Durable pending-change queue over the durable store port
//! - [`engine`] - Sync state machine and drain protocol
//!
//! ## Drain protocol
//!
//! A drain snapshots the queue, applies each change to the remote store in
//! FIFO order, and removes each change individually as it is confirmed.
//! The first failure stops the drain so that dependent changes are never
//! applied out of order; everything not yet applied stays queued for the
//! next trigger. There is no internal retry loop: one attempt per trigger.

pub mod engine;
pub mod queue;

pub use engine::SyncEngine;
pub use queue::PendingQueue;
