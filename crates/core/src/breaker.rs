// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Circuit breaker guarding the remote endpoint.
//!
//! State machine:
//!
//! ```text
//! Closed ──(threshold failures in window)──► Open
//! Open ──(cool-down elapsed)──► HalfOpen
//! HalfOpen ──(probe success)──► Closed
//! HalfOpen ──(probe failure)──► Open
//! ```
//!
//! While `Open`, calls fail fast without touching the network. `HalfOpen`
//! admits exactly one probe; its outcome decides the next state.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::{SharedClock, SystemClock};
use crate::error::ErrorKind;

/// Configuration for the circuit breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Failures within the rolling window that trip the circuit.
    pub failure_threshold: u32,
    /// Rolling window for counting failures, in milliseconds.
    pub window_ms: u64,
    /// Cool-down before a tripped circuit admits a probe, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_threshold: 5,
            window_ms: 60_000,
            cooldown_ms: 30_000,
        }
    }
}

/// Circuit breaker state. Exactly one is active at a time per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Healthy; calls pass through.
    Closed,
    /// Tripped; calls fail fast until the cool-down elapses.
    Open,
    /// Probing; exactly one call is allowed through.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Rolling-window circuit breaker for one logical endpoint.
pub struct CircuitBreaker {
    config: BreakerConfig,
    clock: SharedClock,
    state: CircuitState,
    /// Timestamps of recent failures, pruned to the rolling window.
    failures: VecDeque<u64>,
    /// When the circuit last transitioned to `Open`.
    opened_at_ms: u64,
    /// True while the single half-open probe is in flight.
    probe_in_flight: bool,
}

impl CircuitBreaker {
    /// Creates a breaker with the system clock.
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_clock(config, SystemClock::shared())
    }

    /// Creates a breaker with a custom clock source.
    pub fn with_clock(config: BreakerConfig, clock: SharedClock) -> Self {
        CircuitBreaker {
            config,
            clock,
            state: CircuitState::Closed,
            failures: VecDeque::new(),
            opened_at_ms: 0,
            probe_in_flight: false,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Asks permission to attempt a call.
    ///
    /// Transitions `Open → HalfOpen` once the cool-down has elapsed and
    /// admits the single probe; otherwise fails fast with `CircuitOpen`.
    pub fn try_acquire(&mut self) -> Result<(), ErrorKind> {
        match self.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let now = self.clock.now_ms();
                if now >= self.opened_at_ms.saturating_add(self.config.cooldown_ms) {
                    tracing::debug!("cool-down elapsed, probing");
                    self.state = CircuitState::HalfOpen;
                    self.probe_in_flight = true;
                    Ok(())
                } else {
                    Err(ErrorKind::CircuitOpen)
                }
            }
            CircuitState::HalfOpen => {
                if self.probe_in_flight {
                    Err(ErrorKind::CircuitOpen)
                } else {
                    self.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&mut self) {
        match self.state {
            CircuitState::HalfOpen => {
                tracing::info!("probe succeeded, circuit closed");
                self.state = CircuitState::Closed;
                self.failures.clear();
                self.probe_in_flight = false;
            }
            CircuitState::Closed => self.prune(),
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    pub fn record_failure(&mut self) {
        let now = self.clock.now_ms();
        match self.state {
            CircuitState::HalfOpen => {
                tracing::warn!("probe failed, circuit re-opened");
                self.open(now);
            }
            CircuitState::Closed => {
                self.failures.push_back(now);
                self.prune();
                if self.failures.len() as u32 >= self.config.failure_threshold {
                    tracing::warn!(
                        failures = self.failures.len(),
                        "failure threshold reached, circuit opened"
                    );
                    self.open(now);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn open(&mut self, now: u64) {
        self.state = CircuitState::Open;
        self.opened_at_ms = now;
        self.probe_in_flight = false;
        self.failures.clear();
    }

    fn prune(&mut self) {
        let now = self.clock.now_ms();
        let cutoff = now.saturating_sub(self.config.window_ms);
        while self.failures.front().is_some_and(|&t| t < cutoff) {
            self.failures.pop_front();
        }
    }
}

#[cfg(test)]
#[path = "breaker_tests.rs"]
mod tests;
