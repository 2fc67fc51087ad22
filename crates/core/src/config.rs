// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregate configuration for the sync layer.
//!
//! Every section has conservative defaults, so an empty config is a valid
//! one. Sections deserialize independently; unknown fields are ignored for
//! forward compatibility.

use serde::{Deserialize, Serialize};

use crate::breaker::BreakerConfig;
use crate::cache::CacheConfig;
use crate::connection::RetryConfig;
use crate::health::HealthConfig;
use crate::orchestrator::SyncConfig;

/// Tuning knobs for all components, assembled by the caller or loaded
/// from a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier for this client, used as the entry-id tiebreaker.
    /// Distinct per device of the same account.
    pub node_id: u32,
    /// Retry and timeout policy for remote calls.
    pub retry: RetryConfig,
    /// Circuit breaker thresholds.
    pub breaker: BreakerConfig,
    /// Read cache sizing and TTL.
    pub cache: CacheConfig,
    /// Health probe cadence and debounce.
    pub health: HealthConfig,
    /// Sync run cadence and dead-letter policy.
    pub sync: SyncConfig,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
