// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn put_get_delete() {
    let store = MemoryStore::new();

    store.put("queue/1", "one").unwrap();
    assert_eq!(store.get("queue/1").unwrap(), Some("one".to_string()));

    store.put("queue/1", "updated").unwrap();
    assert_eq!(store.get("queue/1").unwrap(), Some("updated".to_string()));

    store.delete("queue/1").unwrap();
    assert_eq!(store.get("queue/1").unwrap(), None);
}

#[test]
fn delete_absent_key_is_ok() {
    let store = MemoryStore::new();
    store.delete("queue/missing").unwrap();
}

#[test]
fn list_by_prefix_is_ordered_and_isolated() {
    let store = MemoryStore::new();
    store.put("queue/b", "2").unwrap();
    store.put("queue/a", "1").unwrap();
    store.put("data/x", "other").unwrap();
    store.put("queuez", "not a queue key").unwrap();

    let records = store.list_by_prefix("queue/").unwrap();
    assert_eq!(
        records,
        vec![
            ("queue/a".to_string(), "1".to_string()),
            ("queue/b".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn list_by_prefix_empty() {
    let store = MemoryStore::new();
    assert!(store.list_by_prefix("queue/").unwrap().is_empty());
}

#[test]
fn len_counts_records() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    store.put("a", "1").unwrap();
    store.put("b", "2").unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn shared_store_is_usable_through_arc() {
    let store = MemoryStore::shared();
    store.put("meta/last-sync", "2026-01-01T00:00:00Z").unwrap();
    assert!(store.get("meta/last-sync").unwrap().is_some());
}
