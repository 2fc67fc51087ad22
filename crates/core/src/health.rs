// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection health tracking.
//!
//! Two inputs feed the monitor:
//! - passive signals: every ConnectionManager call records its outcome
//!   into the shared [`HealthSignals`] atomics
//! - active probes: a periodic background task runs a lightweight probe
//!   and reports the result through [`HealthMonitor::observe`]
//!
//! Transitions are debounced: a state change is published only after the
//! new state has been observed consistently, so one flaky probe cannot
//! trigger a sync storm. A `disconnected → connected` transition emits a
//! one-shot [`HealthEvent::Reconnected`], the primary sync trigger.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::clock::{SharedClock, SystemClock};
use crate::error::ErrorKind;

/// Configuration for the health monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Interval between background probes, in milliseconds.
    pub probe_interval_ms: u64,
    /// Number of samples kept in the sliding window.
    pub window: usize,
    /// Consecutive consistent observations required before a transition
    /// is published.
    pub debounce_samples: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            probe_interval_ms: 30_000,
            window: 20,
            debounce_samples: 2,
        }
    }
}

/// Connectivity transition published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthEvent {
    /// Connectivity was restored after being down.
    Reconnected,
    /// Connectivity was lost.
    Disconnected,
}

/// One connectivity observation in the sliding window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSample {
    /// When the observation was made.
    pub at: DateTime<Utc>,
    /// Whether the endpoint was reachable.
    pub connected: bool,
    /// Probe round-trip time, when measured.
    pub latency_ms: Option<u64>,
}

/// Point-in-time health summary for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    /// Current debounced connectivity state.
    pub online: bool,
    /// Time of the most recent successful remote call.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Time of the most recent failed remote call.
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Fraction of window samples that observed connectivity (1.0 when
    /// the window is empty).
    pub rolling_success_rate: f64,
    /// Mean latency over window samples that measured one.
    pub average_latency_ms: Option<u64>,
}

/// Lock-free pass/fail tallies shared with the ConnectionManager.
pub struct HealthSignals {
    successes: AtomicU64,
    failures: AtomicU64,
    total_latency_ms: AtomicU64,
    /// Epoch ms of the last success; 0 = never.
    last_success_ms: AtomicU64,
    /// Epoch ms of the last failure; 0 = never.
    last_failure_ms: AtomicU64,
    clock: SharedClock,
}

impl HealthSignals {
    /// Creates signals with the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::shared())
    }

    /// Creates signals with a custom clock source.
    pub fn with_clock(clock: SharedClock) -> Self {
        HealthSignals {
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            clock,
        }
    }

    /// Records one successful remote call.
    pub fn record_success(&self, latency_ms: u64) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.last_success_ms
            .store(self.clock.now_ms(), Ordering::Release);
    }

    /// Records one failed remote call.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.last_failure_ms
            .store(self.clock.now_ms(), Ordering::Release);
    }

    /// Total successful calls.
    pub fn success_count(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Total failed calls.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Mean latency over all successful calls.
    pub fn average_latency_ms(&self) -> Option<u64> {
        let count = self.success_count();
        if count == 0 {
            None
        } else {
            Some(self.total_latency_ms.load(Ordering::Relaxed) / count)
        }
    }

    /// Time of the most recent success.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        epoch_ms_to_utc(self.last_success_ms.load(Ordering::Acquire))
    }

    /// Time of the most recent failure.
    pub fn last_failure_at(&self) -> Option<DateTime<Utc>> {
        epoch_ms_to_utc(self.last_failure_ms.load(Ordering::Acquire))
    }
}

impl Default for HealthSignals {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_ms_to_utc(ms: u64) -> Option<DateTime<Utc>> {
    if ms == 0 {
        None
    } else {
        DateTime::<Utc>::from_timestamp_millis(ms as i64)
    }
}

/// Debounce bookkeeping and the sample window.
struct MonitorInner {
    online: bool,
    pending_state: Option<bool>,
    pending_count: u32,
    samples: VecDeque<HealthSample>,
}

/// Tracks connectivity and publishes debounced transitions.
pub struct HealthMonitor {
    config: HealthConfig,
    signals: Arc<HealthSignals>,
    inner: Mutex<MonitorInner>,
    events: broadcast::Sender<HealthEvent>,
    cancel: CancellationToken,
}

impl HealthMonitor {
    /// Creates a monitor. Starts optimistically online; the first failed
    /// probe (debounced) flips it.
    pub fn new(config: HealthConfig, signals: Arc<HealthSignals>) -> Self {
        let (events, _) = broadcast::channel(16);
        HealthMonitor {
            config,
            signals,
            inner: Mutex::new(MonitorInner {
                online: true,
                pending_state: None,
                pending_count: 0,
                samples: VecDeque::new(),
            }),
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribes to connectivity transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Current debounced connectivity state.
    pub fn is_online(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).online
    }

    /// Feeds one connectivity observation into the window and the
    /// debounce logic.
    pub fn observe(&self, connected: bool, latency_ms: Option<u64>) {
        let event = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

            inner.samples.push_back(HealthSample {
                at: Utc::now(),
                connected,
                latency_ms,
            });
            while inner.samples.len() > self.config.window {
                inner.samples.pop_front();
            }

            if connected == inner.online {
                // Observation agrees with the published state.
                inner.pending_state = None;
                inner.pending_count = 0;
                None
            } else {
                match inner.pending_state {
                    Some(pending) if pending == connected => inner.pending_count += 1,
                    _ => {
                        inner.pending_state = Some(connected);
                        inner.pending_count = 1;
                    }
                }

                if inner.pending_count >= self.config.debounce_samples {
                    inner.online = connected;
                    inner.pending_state = None;
                    inner.pending_count = 0;
                    Some(if connected {
                        HealthEvent::Reconnected
                    } else {
                        HealthEvent::Disconnected
                    })
                } else {
                    None
                }
            }
        };

        if let Some(event) = event {
            tracing::info!(?event, "connectivity transition");
            let _ = self.events.send(event);
        }
    }

    /// Platform connectivity hint (e.g. the OS network-change signal).
    pub fn set_connected(&self, connected: bool) {
        self.observe(connected, None);
    }

    /// Point-in-time health summary.
    pub fn status(&self) -> HealthStatus {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        let total = inner.samples.len();
        let rolling_success_rate = if total == 0 {
            1.0
        } else {
            let up = inner.samples.iter().filter(|s| s.connected).count();
            up as f64 / total as f64
        };

        let latencies: Vec<u64> = inner.samples.iter().filter_map(|s| s.latency_ms).collect();
        let average_latency_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<u64>() / latencies.len() as u64)
        };

        HealthStatus {
            online: inner.online,
            last_success_at: self.signals.last_success_at(),
            last_failure_at: self.signals.last_failure_at(),
            rolling_success_rate,
            average_latency_ms,
        }
    }

    /// Starts the periodic probe task.
    ///
    /// `probe` runs once per interval; `Ok(latency_ms)` counts as a
    /// connected observation, `Err` as disconnected. The task stops when
    /// [`HealthMonitor::shutdown`] is called.
    pub fn start<F, Fut>(self: &Arc<Self>, probe: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u64, ErrorKind>> + Send,
    {
        let monitor = Arc::clone(self);
        let cancel = self.cancel.clone();
        // interval panics on a zero period
        let interval = Duration::from_millis(self.config.probe_interval_ms.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // interval fires immediately; skip the initial tick so the
            // first probe waits one period.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        match probe().await {
                            Ok(latency_ms) => monitor.observe(true, Some(latency_ms)),
                            Err(e) => {
                                tracing::debug!(error = %e, "probe failed");
                                monitor.observe(false, None);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Stops the probe task. Safe to call more than once.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
