// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.base_delay_ms, 1000);
    assert_eq!(config.breaker.failure_threshold, 5);
    assert_eq!(config.cache.capacity, 500);
    assert_eq!(config.cache.default_ttl_ms, 60_000);
    assert_eq!(config.health.probe_interval_ms, 30_000);
    assert_eq!(config.sync.interval_ms, 300_000);
    assert_eq!(config.sync.max_attempts, 10);
}

#[test]
fn empty_document_deserializes_to_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.node_id, 0);
    assert_eq!(config.retry.max_retries, 3);
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config: Config = serde_json::from_str(
        r#"{"node_id": 3, "retry": {"max_retries": 7}, "breaker": {"cooldown_ms": 1000}}"#,
    )
    .unwrap();

    assert_eq!(config.node_id, 3);
    assert_eq!(config.retry.max_retries, 7);
    // Untouched fields fall back to defaults
    assert_eq!(config.retry.base_delay_ms, 1000);
    assert_eq!(config.breaker.cooldown_ms, 1000);
    assert_eq!(config.breaker.failure_threshold, 5);
}

#[test]
fn roundtrips_through_serde() {
    let mut config = Config::default();
    config.node_id = 9;
    config.retry.jitter = true;

    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.node_id, 9);
    assert!(parsed.retry.jitter);
}
