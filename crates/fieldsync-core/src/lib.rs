//! FieldSync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `CacheEnvelope`, `PendingChange`, `SyncState`, `PermissionRecord`
//! - **Port definitions** - Traits for adapters: `IDurableStore`, `IRemoteStore`, `IPermissionPlatform`
//! - **Configuration** - Typed config with YAML loading and defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement. The cache
//! engine, pending-change queue, sync engine, and permission tracker live in
//! sibling crates and orchestrate these ports.

pub mod config;
pub mod domain;
pub mod ports;
