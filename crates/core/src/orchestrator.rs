// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync orchestration: when and how local and remote state reconcile.
//!
//! A run is triggered by a reconnect event, the periodic timer, or an
//! explicit caller. At most one run executes at a time; concurrent
//! triggers coalesce into an immediate `AlreadyInProgress` result rather
//! than queuing.
//!
//! Each run has two phases:
//! 1. **Upload**: replay the offline queue FIFO through the
//!    ConnectionManager. A failing entry is retried in place on the next
//!    run; it never blocks or reorders later entries.
//! 2. **Download**: fetch remote deltas since the last fully successful
//!    run, write them into local storage, and invalidate affected cache
//!    keys before the run reports completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::breaker::CircuitState;
use crate::cache::TtlCache;
use crate::clock::SharedClock;
use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::error::{ErrorKind, Result};
use crate::health::{HealthEvent, HealthMonitor, HealthSignals};
use crate::id::{EntryId, IdGenerator};
use crate::queue::OfflineQueue;
use crate::remote::RemoteBackend;
use crate::store::SharedStore;

/// Key prefix for downloaded records in the local store.
const DATA_PREFIX: &str = "data/";
/// Key holding the watermark of the last fully successful run.
const LAST_SYNC_KEY: &str = "meta/last-sync";

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between timer-triggered runs while online, in
    /// milliseconds.
    pub interval_ms: u64,
    /// Non-retryable failures after which an entry is dead-lettered.
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_ms: 300_000,
            max_attempts: 10,
        }
    }
}

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Both phases ran (possibly with per-entry errors).
    Completed,
    /// Another run was active; nothing was done.
    AlreadyInProgress,
    /// The health monitor reported offline; nothing was done.
    Offline,
}

/// Summary of one orchestration pass. Only the most recent run is
/// retained, for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// How the run ended.
    pub outcome: SyncOutcome,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Entries uploaded and removed from the queue.
    pub uploaded: usize,
    /// Records pulled from the remote.
    pub downloaded: usize,
    /// Errors collected across both phases. Partial success is reported,
    /// not hidden.
    pub errors: Vec<ErrorKind>,
    /// Wall time of the run in milliseconds.
    pub duration_ms: u64,
}

impl SyncReport {
    /// True only for a completed run with an empty error list.
    pub fn success(&self) -> bool {
        self.outcome == SyncOutcome::Completed && self.errors.is_empty()
    }

    fn skipped(outcome: SyncOutcome) -> Self {
        SyncReport {
            outcome,
            started_at: Utc::now(),
            uploaded: 0,
            downloaded: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }
}

/// Snapshot polled by UI status indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    /// Debounced connectivity state.
    pub online: bool,
    /// Entries awaiting replay.
    pub pending_count: usize,
    /// Dead-lettered entries awaiting manual resolution.
    pub dead_count: usize,
    /// Watermark of the last fully successful run.
    pub last_successful_sync_at: Option<DateTime<Utc>>,
    /// Current circuit breaker state.
    pub circuit_state: CircuitState,
}

/// Releases the run flag on every exit path, including early returns.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Top-level coordinator over queue, connection, cache, and health.
pub struct SyncOrchestrator {
    config: SyncConfig,
    queue: OfflineQueue,
    store: SharedStore,
    cache: Mutex<TtlCache<serde_json::Value>>,
    cache_default_ttl_ms: u64,
    connection: ConnectionManager,
    health: Arc<HealthMonitor>,
    backend: Arc<dyn RemoteBackend>,
    running: AtomicBool,
    last_report: Mutex<Option<SyncReport>>,
    completions: broadcast::Sender<SyncReport>,
    cancel: CancellationToken,
}

impl SyncOrchestrator {
    /// Wires up the full stack over the given store and backend.
    pub fn new(config: Config, store: SharedStore, backend: Arc<dyn RemoteBackend>) -> Self {
        Self::assemble(config, store, backend, None)
    }

    /// Like [`SyncOrchestrator::new`] but with an injected clock, for
    /// deterministic tests.
    pub fn with_clock(
        config: Config,
        store: SharedStore,
        backend: Arc<dyn RemoteBackend>,
        clock: SharedClock,
    ) -> Self {
        Self::assemble(config, store, backend, Some(clock))
    }

    fn assemble(
        config: Config,
        store: SharedStore,
        backend: Arc<dyn RemoteBackend>,
        clock: Option<SharedClock>,
    ) -> Self {
        let (signals, connection, cache, ids) = match clock {
            Some(clock) => {
                let signals = Arc::new(HealthSignals::with_clock(Arc::clone(&clock)));
                (
                    Arc::clone(&signals),
                    ConnectionManager::with_clock(
                        config.retry.clone(),
                        config.breaker.clone(),
                        signals,
                        Arc::clone(&clock),
                    ),
                    TtlCache::with_clock(config.cache.capacity, Arc::clone(&clock)),
                    IdGenerator::with_clock(clock, config.node_id),
                )
            }
            None => {
                let signals = Arc::new(HealthSignals::new());
                (
                    Arc::clone(&signals),
                    ConnectionManager::new(config.retry.clone(), config.breaker.clone(), signals),
                    TtlCache::new(config.cache.capacity),
                    IdGenerator::new(config.node_id),
                )
            }
        };

        let (completions, _) = broadcast::channel(16);

        SyncOrchestrator {
            queue: OfflineQueue::new(Arc::clone(&store), ids),
            store,
            cache: Mutex::new(cache),
            cache_default_ttl_ms: config.cache.default_ttl_ms,
            connection,
            health: Arc::new(HealthMonitor::new(config.health.clone(), signals)),
            backend,
            config: config.sync.clone(),
            running: AtomicBool::new(false),
            last_report: Mutex::new(None),
            completions,
            cancel: CancellationToken::new(),
        }
    }

    /// The health monitor, for connectivity hints and subscriptions.
    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    /// The offline queue, for inspection.
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    /// Non-blocking durable write path. Never touches the network.
    pub fn enqueue(&self, kind: impl Into<String>, payload: serde_json::Value) -> Result<EntryId> {
        self.queue.enqueue(kind, payload)
    }

    /// Subscribes to completed-run reports.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<SyncReport> {
        self.completions.subscribe()
    }

    /// The most recent run's report, if any run has happened.
    pub fn last_report(&self) -> Option<SyncReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot for status indicators. Always reflects the true pending
    /// and dead counts.
    pub fn status(&self) -> Result<SyncStatus> {
        Ok(SyncStatus {
            online: self.health.is_online(),
            pending_count: self.queue.pending_count()?,
            dead_count: self.queue.dead_count()?,
            last_successful_sync_at: self.last_successful_sync_at()?,
            circuit_state: self.connection.circuit_state(),
        })
    }

    /// Reads a value through the cache, falling back to downloaded
    /// records in local storage.
    pub fn read_record(&self, key: &str) -> Result<Option<serde_json::Value>> {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(value) = cache.get(key) {
                return Ok(Some(value.clone()));
            }
        }

        match self.store.get(&format!("{DATA_PREFIX}{key}"))? {
            Some(json) => {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                self.cache
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .set(key, value.clone(), self.cache_default_ttl_ms);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Runs one reconciliation pass. This is also the explicit
    /// caller-initiated "force sync" entry point.
    pub async fn sync(&self) -> SyncReport {
        // Coalesce concurrent triggers: second caller returns
        // immediately, nothing is queued.
        let guard = if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            RunGuard(&self.running)
        } else {
            tracing::debug!("sync already in progress");
            return SyncReport::skipped(SyncOutcome::AlreadyInProgress);
        };

        if !self.health.is_online() {
            tracing::debug!("offline, skipping sync");
            return SyncReport::skipped(SyncOutcome::Offline);
        }

        let started_at = Utc::now();
        let started = Instant::now();
        let mut uploaded = 0usize;
        let mut downloaded = 0usize;
        let mut errors: Vec<ErrorKind> = Vec::new();

        self.upload_phase(&mut uploaded, &mut errors).await;
        self.download_phase(&mut downloaded, &mut errors).await;

        // Advance the watermark only after a fully clean run so failed
        // entries and missed deltas are retried next time.
        if errors.is_empty() {
            if let Err(e) = self.store.put(LAST_SYNC_KEY, &started_at.to_rfc3339()) {
                errors.push(ErrorKind::Storage(e.to_string()));
            }
        }

        let report = SyncReport {
            outcome: SyncOutcome::Completed,
            started_at,
            uploaded,
            downloaded,
            errors,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            uploaded = report.uploaded,
            downloaded = report.downloaded,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "sync run finished"
        );

        *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());
        let _ = self.completions.send(report.clone());
        drop(guard);
        report
    }

    /// Replays the queue FIFO. Partial-failure semantics: one failing
    /// entry records its error and the run moves on.
    async fn upload_phase(&self, uploaded: &mut usize, errors: &mut Vec<ErrorKind>) {
        let pending = match self.queue.list_pending() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "failed to read queue");
                errors.push(ErrorKind::Storage(e.to_string()));
                return;
            }
        };

        for entry in pending {
            let result = self
                .connection
                .execute(|| {
                    let backend = Arc::clone(&self.backend);
                    let entry = entry.clone();
                    async move { backend.upload(&entry).await }
                })
                .await;

            match result {
                Ok(()) => {
                    if let Err(e) = self.queue.mark_synced(entry.id) {
                        tracing::error!(id = %entry.id, error = %e, "failed to remove synced entry");
                        errors.push(ErrorKind::Storage(e.to_string()));
                        continue;
                    }
                    *uploaded += 1;
                    // Bust reads the mutation invalidates, before the run
                    // reports completion.
                    self.cache
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .invalidate(&format!("{}*", entry.kind));
                }
                Err(ErrorKind::CircuitOpen) => {
                    // Nothing was attempted and nothing else will get
                    // through this run; remaining entries stay queued.
                    tracing::warn!("circuit open, ending upload phase");
                    errors.push(ErrorKind::CircuitOpen);
                    return;
                }
                Err(kind) => {
                    tracing::warn!(id = %entry.id, error = %kind, "upload failed, entry stays queued");
                    match self.queue.increment_attempt(entry.id) {
                        Ok(attempts) => {
                            if !kind.is_retryable() && attempts >= self.config.max_attempts {
                                if let Err(e) = self.queue.mark_dead(entry.id) {
                                    tracing::error!(id = %entry.id, error = %e, "failed to dead-letter entry");
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(id = %entry.id, error = %e, "failed to record attempt");
                        }
                    }
                    errors.push(kind);
                }
            }
        }
    }

    /// Pulls remote deltas since the watermark into local storage.
    async fn download_phase(&self, downloaded: &mut usize, errors: &mut Vec<ErrorKind>) {
        let since = match self.last_successful_sync_at() {
            Ok(since) => since,
            Err(e) => {
                errors.push(ErrorKind::Storage(e.to_string()));
                return;
            }
        };

        let result = self
            .connection
            .execute(|| {
                let backend = Arc::clone(&self.backend);
                async move { backend.fetch_deltas(since).await }
            })
            .await;

        let records = match result {
            Ok(records) => records,
            Err(kind) => {
                tracing::warn!(error = %kind, "delta fetch failed");
                errors.push(kind);
                return;
            }
        };

        for record in records {
            let json = match serde_json::to_string(&record.payload) {
                Ok(json) => json,
                Err(e) => {
                    errors.push(ErrorKind::Storage(e.to_string()));
                    continue;
                }
            };
            if let Err(e) = self.store.put(&format!("{DATA_PREFIX}{}", record.key), &json) {
                errors.push(ErrorKind::Storage(e.to_string()));
                continue;
            }
            self.cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .invalidate(&record.key);
            *downloaded += 1;
        }
    }

    fn last_successful_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        match self.store.get(LAST_SYNC_KEY)? {
            Some(raw) => {
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|_| {
                        crate::error::Error::CorruptedRecord(format!(
                            "invalid watermark '{raw}' in '{LAST_SYNC_KEY}'"
                        ))
                    })?
                    .with_timezone(&Utc);
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Starts the background triggers: the periodic timer and the
    /// reconnect listener, plus the health monitor's probe task.
    pub fn start(self: &Arc<Self>) {
        // Probe through the ConnectionManager so probe outcomes feed the
        // breaker and the passive signals.
        let this = Arc::clone(self);
        self.health.start(move || {
            let this = Arc::clone(&this);
            async move {
                let started = Instant::now();
                this.connection
                    .execute(|| {
                        let backend = Arc::clone(&this.backend);
                        async move { backend.probe().await }
                    })
                    .await?;
                Ok(started.elapsed().as_millis() as u64)
            }
        });

        // Periodic timer while online.
        let this = Arc::clone(self);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            // interval panics on a zero period
            let mut ticker =
                tokio::time::interval(Duration::from_millis(this.config.interval_ms.max(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if this.health.is_online() {
                            let _ = this.sync().await;
                        }
                    }
                }
            }
        });

        // Reconnect listener.
        let this = Arc::clone(self);
        let cancel = self.cancel.clone();
        let mut events = self.health.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(HealthEvent::Reconnected) => {
                            tracing::info!("reconnected, starting sync");
                            let _ = this.sync().await;
                        }
                        Ok(HealthEvent::Disconnected) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "health events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });
    }

    /// Cancels all background tasks. Safe to call more than once.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.health.shutdown();
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
