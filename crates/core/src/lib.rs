// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! drift-core: Resilient synchronization layer for offline-first clients
//!
//! This crate provides the offline mutation queue, retry and circuit
//! breaker policy, read cache, health monitoring, and the orchestrator
//! that ties them together. The remote backend is abstracted behind
//! [`RemoteBackend`]; drift-remote supplies the WebSocket implementation.

pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod connection;
pub mod entry;
pub mod error;
pub mod health;
pub mod id;
pub mod orchestrator;
pub mod queue;
pub mod remote;
pub mod sqlite;
pub mod store;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitState};
pub use cache::{CacheConfig, TtlCache};
pub use clock::{ClockSource, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use connection::{ConnectionManager, RetryConfig};
pub use entry::{QueueEntry, RemoteRecord};
pub use error::{Error, ErrorKind, Result};
pub use health::{HealthConfig, HealthEvent, HealthMonitor, HealthSignals, HealthStatus};
pub use id::{EntryId, IdGenerator};
pub use orchestrator::{SyncConfig, SyncOrchestrator, SyncOutcome, SyncReport, SyncStatus};
pub use queue::OfflineQueue;
pub use remote::{RemoteBackend, RemoteFuture};
pub use sqlite::SqliteStore;
pub use store::{LocalStore, MemoryStore, SharedStore};
