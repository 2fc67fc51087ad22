// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::ManualClock;

fn test_monitor(debounce_samples: u32) -> HealthMonitor {
    let config = HealthConfig {
        probe_interval_ms: 30_000,
        window: 5,
        debounce_samples,
    };
    HealthMonitor::new(config, Arc::new(HealthSignals::new()))
}

#[test]
fn signals_tally_outcomes() {
    let clock = ManualClock::shared(1_000_000);
    let signals = HealthSignals::with_clock(clock.clone());

    assert_eq!(signals.success_count(), 0);
    assert_eq!(signals.average_latency_ms(), None);
    assert_eq!(signals.last_success_at(), None);

    signals.record_success(100);
    signals.record_success(300);
    clock.advance(500);
    signals.record_failure();

    assert_eq!(signals.success_count(), 2);
    assert_eq!(signals.failure_count(), 1);
    assert_eq!(signals.average_latency_ms(), Some(200));
    assert!(signals.last_success_at().is_some());
    assert!(signals.last_failure_at() > signals.last_success_at());
}

#[test]
fn starts_optimistically_online() {
    let monitor = test_monitor(2);
    assert!(monitor.is_online());
}

#[test]
fn single_bad_observation_is_debounced() {
    let monitor = test_monitor(2);
    monitor.observe(false, None);
    assert!(monitor.is_online());
}

#[test]
fn consecutive_bad_observations_flip_state() {
    let monitor = test_monitor(2);
    let mut events = monitor.subscribe();

    monitor.observe(false, None);
    monitor.observe(false, None);

    assert!(!monitor.is_online());
    assert_eq!(events.try_recv().unwrap(), HealthEvent::Disconnected);
}

#[test]
fn agreeing_observation_resets_the_debounce() {
    let monitor = test_monitor(2);

    monitor.observe(false, None);
    monitor.observe(true, Some(10));
    monitor.observe(false, None);

    // Never two in a row, so still online
    assert!(monitor.is_online());
}

#[test]
fn reconnect_emits_one_event() {
    let monitor = test_monitor(2);
    let mut events = monitor.subscribe();

    monitor.observe(false, None);
    monitor.observe(false, None);
    assert_eq!(events.try_recv().unwrap(), HealthEvent::Disconnected);

    monitor.observe(true, Some(20));
    monitor.observe(true, Some(25));
    assert!(monitor.is_online());
    assert_eq!(events.try_recv().unwrap(), HealthEvent::Reconnected);

    // Further agreeing observations emit nothing
    monitor.observe(true, Some(30));
    assert!(events.try_recv().is_err());
}

#[test]
fn debounce_of_one_flips_immediately() {
    let monitor = test_monitor(1);
    monitor.observe(false, None);
    assert!(!monitor.is_online());
}

#[test]
fn set_connected_feeds_the_same_path() {
    let monitor = test_monitor(1);
    monitor.set_connected(false);
    assert!(!monitor.is_online());
    monitor.set_connected(true);
    assert!(monitor.is_online());
}

#[test]
fn status_reflects_window() {
    let monitor = test_monitor(1);

    monitor.observe(true, Some(100));
    monitor.observe(true, Some(200));
    monitor.observe(false, None);
    monitor.observe(true, Some(300));

    let status = monitor.status();
    assert!(status.online);
    assert_eq!(status.rolling_success_rate, 0.75);
    assert_eq!(status.average_latency_ms, Some(200));
}

#[test]
fn status_with_empty_window() {
    let monitor = test_monitor(2);
    let status = monitor.status();
    assert!(status.online);
    assert_eq!(status.rolling_success_rate, 1.0);
    assert_eq!(status.average_latency_ms, None);
}

#[test]
fn window_is_bounded() {
    let monitor = test_monitor(1);

    // Five bad samples fill the window, then five good ones displace them
    for _ in 0..5 {
        monitor.observe(false, None);
    }
    for _ in 0..5 {
        monitor.observe(true, Some(10));
    }

    let status = monitor.status();
    assert_eq!(status.rolling_success_rate, 1.0);
}

#[tokio::test(start_paused = true)]
async fn probe_task_drives_observations() {
    let config = HealthConfig {
        probe_interval_ms: 1000,
        window: 5,
        debounce_samples: 1,
    };
    let monitor = Arc::new(HealthMonitor::new(config, Arc::new(HealthSignals::new())));

    monitor.start(|| async { Err(ErrorKind::Network("down".into())) });

    // Allow a few probe intervals to elapse
    tokio::time::sleep(std::time::Duration::from_millis(3500)).await;
    assert!(!monitor.is_online());

    monitor.shutdown();
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_probing() {
    let config = HealthConfig {
        probe_interval_ms: 1000,
        window: 5,
        debounce_samples: 1,
    };
    let monitor = Arc::new(HealthMonitor::new(config, Arc::new(HealthSignals::new())));

    monitor.start(|| async { Ok(5) });
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    monitor.shutdown();
    tokio::time::sleep(std::time::Duration::from_millis(5000)).await;

    // State settled while probes were running and stays put after
    assert!(monitor.is_online());
}
