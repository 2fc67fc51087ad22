// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection manager wrapping every remote call.
//!
//! [`ConnectionManager::execute`] is the single primitive through which all
//! network traffic flows. It layers, per call:
//! - a bounded timeout on each attempt (timeout classifies as retryable)
//! - retry with exponential backoff for retryable [`ErrorKind`]s
//! - the circuit breaker, consulted before every attempt
//!
//! Outcomes are recorded exactly once per attempt into the breaker and the
//! shared [`HealthSignals`], which the health monitor consumes. The
//! manager never persists queue state; callers decide what a failure
//! means for the entry that produced it.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::breaker::{BreakerConfig, CircuitBreaker, CircuitState};
use crate::clock::{SharedClock, SystemClock};
use crate::error::ErrorKind;
use crate::health::HealthSignals;

/// Retry policy for remote calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds; doubles per retry.
    pub base_delay_ms: u64,
    /// Cap on the backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Add up to 25% random spread to each backoff delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            timeout_ms: 10_000,
            jitter: false,
        }
    }
}

/// Wraps remote calls with retry and circuit-breaker policy.
pub struct ConnectionManager {
    retry: RetryConfig,
    breaker: Mutex<CircuitBreaker>,
    signals: Arc<HealthSignals>,
    clock: SharedClock,
}

impl ConnectionManager {
    /// Creates a manager with the system clock.
    pub fn new(retry: RetryConfig, breaker: BreakerConfig, signals: Arc<HealthSignals>) -> Self {
        Self::with_clock(retry, breaker, signals, SystemClock::shared())
    }

    /// Creates a manager with a custom clock source.
    pub fn with_clock(
        retry: RetryConfig,
        breaker: BreakerConfig,
        signals: Arc<HealthSignals>,
        clock: SharedClock,
    ) -> Self {
        ConnectionManager {
            retry,
            breaker: Mutex::new(CircuitBreaker::with_clock(breaker, Arc::clone(&clock))),
            signals,
            clock,
        }
    }

    /// Current circuit breaker state for status reporting.
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.lock().unwrap_or_else(|e| e.into_inner()).state()
    }

    /// Executes one remote call under the full policy.
    ///
    /// `op` is invoked once per attempt; it must be safe to call again
    /// after a failure. Returns the value on success, or the final
    /// classified error after retries are exhausted, a non-retryable
    /// error occurs, or the circuit is open.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, ErrorKind>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ErrorKind>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            // Fail fast while the circuit is open; nothing is recorded
            // because no call was attempted.
            self.breaker
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .try_acquire()?;

            let started_ms = self.clock.now_ms();
            let outcome = match tokio::time::timeout(
                Duration::from_millis(self.retry.timeout_ms),
                op(),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ErrorKind::Timeout(self.retry.timeout_ms)),
            };

            match outcome {
                Ok(value) => {
                    let latency = self.clock.now_ms().saturating_sub(started_ms);
                    self.breaker
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .record_success();
                    self.signals.record_success(latency);
                    return Ok(value);
                }
                Err(kind) => {
                    self.breaker
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .record_failure();
                    self.signals.record_failure();

                    if !kind.is_retryable() || attempt > self.retry.max_retries {
                        return Err(kind);
                    }

                    let delay = self.backoff_delay(attempt, kind.retry_after_ms());
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %kind,
                        "retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Backoff delay for the retry following the given failed attempt.
    ///
    /// `base * 2^(attempt-1)`, capped, raised to any server-provided
    /// retry hint, with optional jitter.
    fn backoff_delay(&self, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let mut delay_ms = self
            .retry
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.retry.max_delay_ms);

        if let Some(hint) = retry_after_ms {
            delay_ms = delay_ms.max(hint);
        }

        if self.retry.jitter {
            delay_ms = delay_ms.saturating_add(jitter_ms(
                self.clock.now_ms() ^ u64::from(attempt),
                delay_ms,
            ));
        }

        Duration::from_millis(delay_ms)
    }
}

/// Up to 25% additive spread derived from a xorshift of the seed.
fn jitter_ms(seed: u64, delay_ms: u64) -> u64 {
    let mut x = seed | 1;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    let quarter = delay_ms / 4;
    if quarter == 0 {
        0
    } else {
        x % quarter
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
