// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-generated, globally unique, totally ordered entry ids.
//!
//! An [`EntryId`] combines wall clock time with a logical counter so ids
//! stay monotonic even when the wall clock stalls or goes backwards, and a
//! node id keeps ids from different clients distinct.
//!
//! Format: `{wall_ms}-{counter}-{node_id}`
//!
//! Ordering rules:
//! 1. Higher wall_ms wins
//! 2. If wall_ms equal, higher counter wins
//! 3. If both equal, higher node_id wins (deterministic tiebreaker)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::Mutex;

use crate::clock::{SharedClock, SystemClock};
use crate::error::{Error, Result};

/// A unique, ordered identifier for a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for ordering entries created at the same wall time.
    pub counter: u32,
    /// Node identifier for deterministic tiebreaking across clients.
    pub node_id: u32,
}

impl EntryId {
    /// Creates a new id with the given components.
    pub fn new(wall_ms: u64, counter: u32, node_id: u32) -> Self {
        EntryId {
            wall_ms,
            counter,
            node_id,
        }
    }

    /// Creates an id representing the earliest possible time (for queries).
    pub fn min() -> Self {
        EntryId {
            wall_ms: 0,
            counter: 0,
            node_id: 0,
        }
    }
}

impl Ord for EntryId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms
            .cmp(&other.wall_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl PartialOrd for EntryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wall_ms, self.counter, self.node_id)
    }
}

impl FromStr for EntryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidEntryId(format!(
                "expected format 'wall_ms-counter-node_id', got '{s}'"
            )));
        }

        let wall_ms = parts[0].parse::<u64>().map_err(|_| {
            Error::InvalidEntryId(format!("invalid wall_ms '{}' in '{s}'", parts[0]))
        })?;

        let counter = parts[1].parse::<u32>().map_err(|_| {
            Error::InvalidEntryId(format!("invalid counter '{}' in '{s}'", parts[1]))
        })?;

        let node_id = parts[2].parse::<u32>().map_err(|_| {
            Error::InvalidEntryId(format!("invalid node_id '{}' in '{s}'", parts[2]))
        })?;

        Ok(EntryId::new(wall_ms, counter, node_id))
    }
}

/// A generator that produces monotonically increasing entry ids.
///
/// Thread-safe: advances the logical counter when the wall clock stalls
/// or goes backwards, so successive ids always compare greater.
pub struct IdGenerator {
    clock: SharedClock,
    node_id: u32,
    last_wall_ms: Mutex<u64>,
    last_counter: AtomicU32,
}

impl IdGenerator {
    /// Creates a generator with the system clock and given node id.
    pub fn new(node_id: u32) -> Self {
        Self::with_clock(SystemClock::shared(), node_id)
    }

    /// Creates a generator with a custom clock source.
    pub fn with_clock(clock: SharedClock, node_id: u32) -> Self {
        IdGenerator {
            clock,
            node_id,
            last_wall_ms: Mutex::new(0),
            last_counter: AtomicU32::new(0),
        }
    }

    /// Returns the node id for this generator.
    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    /// Generates the next id, strictly greater than all previous ones.
    pub fn next_id(&self) -> EntryId {
        let physical = self.clock.now_ms();
        let mut last_ms = self.last_wall_ms.lock().unwrap_or_else(|e| e.into_inner());

        let (wall_ms, counter) = if physical > *last_ms {
            // Normal case: wall clock advanced
            *last_ms = physical;
            self.last_counter.store(0, AtomicOrdering::SeqCst);
            (physical, 0)
        } else {
            // Clock went backwards or stayed same: increment counter
            let counter = self.last_counter.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            (*last_ms, counter)
        };

        EntryId::new(wall_ms, counter, self.node_id)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
