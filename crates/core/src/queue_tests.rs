// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::ManualClock;
use crate::store::MemoryStore;
use serde_json::json;

fn test_queue() -> OfflineQueue {
    let clock = ManualClock::shared(1_700_000_000_000);
    OfflineQueue::new(MemoryStore::shared(), IdGenerator::with_clock(clock, 1))
}

#[test]
fn enqueue_and_get() {
    let queue = test_queue();
    let id = queue.enqueue("task.create", json!({"title": "a"})).unwrap();

    let entry = queue.get(id).unwrap().unwrap();
    assert_eq!(entry.id, id);
    assert_eq!(entry.kind, "task.create");
    assert_eq!(entry.attempts, 0);
    assert!(!entry.dead);
}

#[test]
fn list_pending_is_fifo() {
    let queue = test_queue();
    let a = queue.enqueue("task.create", json!({"n": 1})).unwrap();
    let b = queue.enqueue("task.update", json!({"n": 2})).unwrap();
    let c = queue.enqueue("task.delete", json!({"n": 3})).unwrap();

    let pending = queue.list_pending().unwrap();
    let ids: Vec<EntryId> = pending.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[test]
fn fifo_survives_lexicographic_key_traps() {
    // Counter 10 sorts before counter 9 lexicographically; ordering must
    // come from the id, not the storage key.
    let queue = test_queue();
    let mut ids = Vec::new();
    for n in 0..12 {
        ids.push(queue.enqueue("task.create", json!({"n": n})).unwrap());
    }

    let pending = queue.list_pending().unwrap();
    let listed: Vec<EntryId> = pending.iter().map(|e| e.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn mark_synced_removes_entry() {
    let queue = test_queue();
    let id = queue.enqueue("task.create", json!({})).unwrap();
    assert_eq!(queue.pending_count().unwrap(), 1);

    queue.mark_synced(id).unwrap();
    assert_eq!(queue.pending_count().unwrap(), 0);
    assert!(queue.get(id).unwrap().is_none());
}

#[test]
fn mark_synced_unknown_entry_errors() {
    let queue = test_queue();
    let err = queue.mark_synced(EntryId::new(1, 2, 3)).unwrap_err();
    assert!(matches!(err, Error::EntryNotFound(_)));
}

#[test]
fn increment_attempt_persists() {
    let queue = test_queue();
    let id = queue.enqueue("task.create", json!({})).unwrap();

    assert_eq!(queue.increment_attempt(id).unwrap(), 1);
    assert_eq!(queue.increment_attempt(id).unwrap(), 2);

    let entry = queue.get(id).unwrap().unwrap();
    assert_eq!(entry.attempts, 2);
}

#[test]
fn dead_entries_leave_replay_but_stay_stored() {
    let queue = test_queue();
    let a = queue.enqueue("task.create", json!({"n": 1})).unwrap();
    let b = queue.enqueue("task.create", json!({"n": 2})).unwrap();

    queue.mark_dead(a).unwrap();

    let pending = queue.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, b);

    let dead = queue.dead_entries().unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].id, a);
    assert_eq!(queue.dead_count().unwrap(), 1);

    // The record itself is still durable
    assert!(queue.get(a).unwrap().unwrap().dead);
}

#[test]
fn counts_start_at_zero() {
    let queue = test_queue();
    assert_eq!(queue.pending_count().unwrap(), 0);
    assert_eq!(queue.dead_count().unwrap(), 0);
}
