// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::Utc;
use serde_json::json;

use crate::id::EntryId;

#[test]
fn new_entry_starts_clean() {
    let entry = QueueEntry::new(
        EntryId::new(1000, 0, 1),
        "task.create",
        json!({"title": "hello"}),
        Utc::now(),
    );

    assert_eq!(entry.kind, "task.create");
    assert!(!entry.synced);
    assert!(!entry.dead);
    assert_eq!(entry.attempts, 0);
}

#[test]
fn entry_serde_roundtrip() {
    let entry = QueueEntry::new(
        EntryId::new(1000, 2, 7),
        "task.update",
        json!({"id": 5, "done": true}),
        Utc::now(),
    );

    let json = serde_json::to_string(&entry).unwrap();
    let parsed: QueueEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(entry, parsed);
}

#[test]
fn entry_flags_default_when_absent() {
    // Records written by older versions may omit the bookkeeping flags.
    let json = r#"{
        "id": {"wall_ms": 1000, "counter": 0, "node_id": 1},
        "kind": "task.create",
        "payload": {},
        "enqueued_at": "2026-01-01T00:00:00Z"
    }"#;

    let entry: QueueEntry = serde_json::from_str(json).unwrap();
    assert!(!entry.synced);
    assert!(!entry.dead);
    assert_eq!(entry.attempts, 0);
}

#[test]
fn remote_record_roundtrip() {
    let record = RemoteRecord {
        key: "tasks/5".into(),
        payload: json!({"title": "fetched"}),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_string(&record).unwrap();
    let parsed: RemoteRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record, parsed);
}
