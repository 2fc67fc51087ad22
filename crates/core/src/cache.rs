// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory TTL cache shielding the backend from redundant reads.
//!
//! Expiry is lazy: an entry past its TTL is treated as absent and evicted
//! on the read that finds it. When the entry count exceeds the configured
//! capacity, the oldest-inserted entry is evicted first (insertion-order,
//! not access-order, keeping eviction O(1)).
//!
//! Not durable by design; correctness never depends on cache contents.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::clock::{SharedClock, SystemClock};

/// Configuration for the TTL cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries before insertion-order eviction.
    pub capacity: usize,
    /// TTL applied by read-through helpers that don't choose their own.
    pub default_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: 500,
            default_ttl_ms: 60_000,
        }
    }
}

/// A single cached value with its expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub value: T,
    /// Number of reads served by this entry.
    pub access_count: u64,
    stored_at_ms: u64,
    ttl_ms: u64,
    seq: u64,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.stored_at_ms.saturating_add(self.ttl_ms)
    }
}

/// Bounded TTL-keyed store.
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order as (seq, key) pairs; stale slots are skipped lazily.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
    capacity: usize,
    clock: SharedClock,
}

impl<T> TtlCache<T> {
    /// Creates a cache with the given capacity and the system clock.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, SystemClock::shared())
    }

    /// Creates a cache with a custom clock source.
    pub fn with_clock(capacity: usize, clock: SharedClock) -> Self {
        TtlCache {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
            capacity,
            clock,
        }
    }

    /// Returns the live value for a key, or `None` if absent or expired.
    ///
    /// An expired entry is evicted by this read.
    pub fn get(&mut self, key: &str) -> Option<&T> {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        let entry = self.entries.get_mut(key)?;
        entry.access_count += 1;
        Some(&entry.value)
    }

    /// Stores a value under the key with the given TTL.
    ///
    /// Re-setting an existing key refreshes its insertion position.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl_ms: u64) {
        let key = key.into();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                access_count: 0,
                stored_at_ms: self.clock.now_ms(),
                ttl_ms,
                seq,
            },
        );
        self.order.push_back((seq, key));
        self.evict_over_capacity();
    }

    /// Removes every entry whose key matches the glob pattern.
    ///
    /// `*` matches any run of characters; everything else is literal.
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, pattern: &str) -> usize {
        let matched: Vec<String> = self
            .entries
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect();
        for key in &matched {
            self.entries.remove(key);
        }
        matched.len()
    }

    /// Number of entries currently held (including not-yet-collected
    /// expired ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some((seq, key)) => {
                    // Skip stale order slots left behind by re-sets and
                    // invalidations.
                    if self.entries.get(&key).is_some_and(|e| e.seq == seq) {
                        self.entries.remove(&key);
                    }
                }
                None => break,
            }
        }
    }
}

/// Match a key against a glob pattern where `*` matches any run of
/// characters.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    let mut segments = pattern.split('*');
    let first = segments.next().unwrap_or("");
    if !key.starts_with(first) {
        return false;
    }
    let mut rest = &key[first.len()..];

    let mut middle: Vec<&str> = segments.collect();
    let last = middle.pop().unwrap_or("");

    for seg in middle {
        if seg.is_empty() {
            continue;
        }
        match rest.find(seg) {
            Some(pos) => rest = &rest[pos + seg.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
