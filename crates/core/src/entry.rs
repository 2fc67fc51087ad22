// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue entries and remote records.
//!
//! Payloads are domain-opaque JSON: the sync layer never interprets them,
//! it only stores, replays, and reports them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntryId;

/// A pending mutation awaiting upload to the remote backend.
///
/// Lifecycle: created by `enqueue`, mutated by the orchestrator on each
/// replay attempt, deleted from durable storage once synced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Client-generated, globally unique, ordered id.
    pub id: EntryId,
    /// Caller-chosen tag describing the kind of mutation.
    pub kind: String,
    /// Domain-opaque payload.
    pub payload: serde_json::Value,
    /// When the entry was enqueued.
    pub enqueued_at: DateTime<Utc>,
    /// True once the consuming remote call has succeeded.
    #[serde(default)]
    pub synced: bool,
    /// Number of failed upload executions so far.
    #[serde(default)]
    pub attempts: u32,
    /// True if the entry has been dead-lettered after repeated
    /// non-retryable failures. Dead entries are excluded from replay but
    /// kept in storage for manual resolution.
    #[serde(default)]
    pub dead: bool,
}

impl QueueEntry {
    /// Creates a fresh, unsynced entry.
    pub fn new(
        id: EntryId,
        kind: impl Into<String>,
        payload: serde_json::Value,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        QueueEntry {
            id,
            kind: kind.into(),
            payload,
            enqueued_at,
            synced: false,
            attempts: 0,
            dead: false,
        }
    }
}

/// A record pulled from the remote backend during the download phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Storage key the record belongs under.
    pub key: String,
    /// Domain-opaque payload.
    pub payload: serde_json::Value,
    /// Server-side modification time.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
