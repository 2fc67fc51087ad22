// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal key/record interface for durable local storage.
//!
//! The offline queue and the download phase persist through this trait so
//! the storage engine stays swappable: [`crate::sqlite::SqliteStore`] in
//! production, [`MemoryStore`] in tests.
//!
//! Values are JSON strings; key namespaces in use:
//! - `queue/{id}`: pending queue entries
//! - `data/{key}`: records pulled from the remote
//! - `meta/{name}`: sync watermarks

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;

/// Durable key/record store.
///
/// Implementations take `&self` and guard internal state themselves so a
/// single store can be shared between the queue and the orchestrator.
pub trait LocalStore: Send + Sync {
    /// Inserts or replaces a record.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Fetches a record by key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Deletes a record. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Lists all records whose key starts with the prefix, ordered by key.
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>>;
}

/// Shared handle to a local store.
pub type SharedStore = Arc<dyn LocalStore>;

/// In-memory store for tests. Not durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates an empty shared store.
    pub fn shared() -> SharedStore {
        Arc::new(MemoryStore::new())
    }

    /// Returns the number of records (for tests).
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
