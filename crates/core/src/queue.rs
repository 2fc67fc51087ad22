// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable offline queue of pending mutations.
//!
//! Entries are appended under `queue/{id}` keys in the local store and
//! replayed in enqueue order (FIFO) to preserve causal intent. An entry
//! leaves durable storage only when `mark_synced` confirms the remote call
//! that consumed it; a permanently failing entry is dead-lettered by
//! `mark_dead` rather than silently dropped.

use chrono::{DateTime, Utc};

use crate::entry::QueueEntry;
use crate::error::{Error, Result};
use crate::id::{EntryId, IdGenerator};
use crate::store::SharedStore;

/// Key prefix for queue entries in the local store.
const QUEUE_PREFIX: &str = "queue/";

/// Durable, ordered queue of pending mutations.
pub struct OfflineQueue {
    store: SharedStore,
    ids: IdGenerator,
}

impl OfflineQueue {
    /// Creates a queue over the given store.
    pub fn new(store: SharedStore, ids: IdGenerator) -> Self {
        OfflineQueue { store, ids }
    }

    fn key(id: EntryId) -> String {
        format!("{QUEUE_PREFIX}{id}")
    }

    /// Appends a mutation to the queue. Durable, never touches the network.
    pub fn enqueue(&self, kind: impl Into<String>, payload: serde_json::Value) -> Result<EntryId> {
        let id = self.ids.next_id();
        let enqueued_at = DateTime::<Utc>::from_timestamp_millis(id.wall_ms as i64)
            .unwrap_or_else(Utc::now);
        let entry = QueueEntry::new(id, kind, payload, enqueued_at);
        self.write(&entry)?;
        tracing::debug!(id = %id, kind = %entry.kind, "enqueued");
        Ok(id)
    }

    /// Fetches a single entry by id.
    pub fn get(&self, id: EntryId) -> Result<Option<QueueEntry>> {
        match self.store.get(&Self::key(id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Returns all replayable entries in enqueue order (FIFO).
    ///
    /// Dead entries are excluded; synced entries no longer exist.
    pub fn list_pending(&self) -> Result<Vec<QueueEntry>> {
        let mut entries = self.load_all()?;
        entries.retain(|e| !e.dead);
        Ok(entries)
    }

    /// Returns dead-lettered entries in enqueue order.
    pub fn dead_entries(&self) -> Result<Vec<QueueEntry>> {
        let mut entries = self.load_all()?;
        entries.retain(|e| e.dead);
        Ok(entries)
    }

    /// Number of entries awaiting replay.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.list_pending()?.len())
    }

    /// Number of dead-lettered entries.
    pub fn dead_count(&self) -> Result<usize> {
        Ok(self.dead_entries()?.len())
    }

    /// Removes an entry whose upload succeeded.
    ///
    /// The record is deleted from durable storage, so the entry can never
    /// be replayed again.
    pub fn mark_synced(&self, id: EntryId) -> Result<()> {
        if self.get(id)?.is_none() {
            return Err(Error::EntryNotFound(id.to_string()));
        }
        self.store.delete(&Self::key(id))?;
        tracing::debug!(id = %id, "marked synced");
        Ok(())
    }

    /// Records one failed upload execution. Returns the new attempt count.
    pub fn increment_attempt(&self, id: EntryId) -> Result<u32> {
        let mut entry = self
            .get(id)?
            .ok_or_else(|| Error::EntryNotFound(id.to_string()))?;
        entry.attempts += 1;
        self.write(&entry)?;
        Ok(entry.attempts)
    }

    /// Dead-letters an entry: it stays in storage and in status reports
    /// but is excluded from replay.
    pub fn mark_dead(&self, id: EntryId) -> Result<()> {
        let mut entry = self
            .get(id)?
            .ok_or_else(|| Error::EntryNotFound(id.to_string()))?;
        entry.dead = true;
        self.write(&entry)?;
        tracing::warn!(id = %id, kind = %entry.kind, attempts = entry.attempts, "entry dead-lettered");
        Ok(())
    }

    fn write(&self, entry: &QueueEntry) -> Result<()> {
        let json = serde_json::to_string(entry)?;
        self.store.put(&Self::key(entry.id), &json)
    }

    fn load_all(&self) -> Result<Vec<QueueEntry>> {
        let mut entries = Vec::new();
        for (_, json) in self.store.list_by_prefix(QUEUE_PREFIX)? {
            let entry: QueueEntry = serde_json::from_str(&json)?;
            entries.push(entry);
        }
        // Key order is lexicographic, not numeric; sort by id for FIFO.
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
