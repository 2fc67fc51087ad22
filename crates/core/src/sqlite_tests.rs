// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::store::LocalStore;
use tempfile::TempDir;

#[test]
fn put_get_delete() {
    let store = SqliteStore::in_memory().unwrap();

    store.put("queue/1", "one").unwrap();
    assert_eq!(store.get("queue/1").unwrap(), Some("one".to_string()));

    store.delete("queue/1").unwrap();
    assert_eq!(store.get("queue/1").unwrap(), None);
}

#[test]
fn put_upserts() {
    let store = SqliteStore::in_memory().unwrap();
    store.put("k", "v1").unwrap();
    store.put("k", "v2").unwrap();
    assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
}

#[test]
fn list_by_prefix_ordered() {
    let store = SqliteStore::in_memory().unwrap();
    store.put("queue/2", "b").unwrap();
    store.put("queue/1", "a").unwrap();
    store.put("data/x", "other").unwrap();

    let records = store.list_by_prefix("queue/").unwrap();
    assert_eq!(
        records,
        vec![
            ("queue/1".to_string(), "a".to_string()),
            ("queue/2".to_string(), "b".to_string()),
        ]
    );
}

#[test]
fn prefix_with_like_metacharacters_is_literal() {
    let store = SqliteStore::in_memory().unwrap();
    store.put("a%b/1", "match").unwrap();
    store.put("axb/1", "no match").unwrap();
    store.put("a_b/1", "underscore").unwrap();

    let records = store.list_by_prefix("a%b/").unwrap();
    assert_eq!(records, vec![("a%b/1".to_string(), "match".to_string())]);

    let records = store.list_by_prefix("a_b/").unwrap();
    assert_eq!(
        records,
        vec![("a_b/1".to_string(), "underscore".to_string())]
    );
}

#[test]
fn survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("drift.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.put("queue/1", "persisted").unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get("queue/1").unwrap(),
        Some("persisted".to_string())
    );
}
