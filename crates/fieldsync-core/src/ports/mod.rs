//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates or in the
//! embedding application.
//!
//! ## Ports Overview
//!
//! - [`IDurableStore`] - Crash-durable key/value persistence
//! - [`IRemoteStore`] - Remote application of pending changes
//! - [`IPermissionPlatform`] - Platform permission check/request calls
//!
//! The connectivity signal is deliberately not a trait: the sync engine
//! consumes a `tokio::sync::watch::Receiver<bool>` directly, keeping this
//! crate free of a runtime dependency.

pub mod durable_store;
pub mod permission_platform;
pub mod remote_store;

pub use durable_store::IDurableStore;
pub use permission_platform::IPermissionPlatform;
pub use remote_store::IRemoteStore;
