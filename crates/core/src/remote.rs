// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote backend abstraction.
//!
//! The sync layer treats the backend as a black box: one async function
//! per logical operation, returning a value or a classified error. The
//! trait uses boxed futures so it stays object-safe and mock
//! implementations are trivial to write for tests.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::entry::{QueueEntry, RemoteRecord};
use crate::error::ErrorKind;

/// Boxed future returned by backend operations.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ErrorKind>> + Send + 'a>>;

/// Black-box interface to the remote backend, supplied by the
/// data-access layer.
pub trait RemoteBackend: Send + Sync {
    /// Uploads one queued mutation. Success means the entry has been
    /// consumed by the backend and may be removed from the queue.
    fn upload<'a>(&'a self, entry: &'a QueueEntry) -> RemoteFuture<'a, ()>;

    /// Fetches records changed since the given watermark (`None` = all).
    fn fetch_deltas(&self, since: Option<DateTime<Utc>>) -> RemoteFuture<'_, Vec<RemoteRecord>>;

    /// Lightweight reachability check used by the health monitor.
    fn probe(&self) -> RemoteFuture<'_, ()>;
}
