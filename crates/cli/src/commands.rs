// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations over the sync orchestrator.

use std::sync::Arc;

use drift_core::{SqliteStore, SyncOrchestrator, SyncOutcome, SyncReport};
use drift_remote::WebSocketBackend;

use crate::cli::Command;
use crate::config::FileConfig;
use crate::error::Result;

/// Builds the orchestrator stack from the loaded configuration.
///
/// Every command is a one-shot pass over the durable state; the
/// orchestrator's background triggers are for long-lived hosts and are
/// deliberately not started here.
fn build_orchestrator(config: &FileConfig) -> Result<SyncOrchestrator> {
    let db_path = config.db_path()?;
    tracing::debug!(db = %db_path.display(), url = %config.url, "opening store");
    let store = Arc::new(SqliteStore::open(db_path)?);
    let backend = Arc::new(WebSocketBackend::new(config.url.clone()));
    Ok(SyncOrchestrator::new(config.sync.clone(), store, backend))
}

/// Dispatches one CLI command.
pub async fn run(config: FileConfig, command: Command) -> Result<()> {
    let orchestrator = build_orchestrator(&config)?;

    match command {
        Command::Enqueue { kind, payload } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)?;
            let id = orchestrator.enqueue(kind, payload)?;
            println!("queued {id}");
        }
        Command::Status => {
            let status = orchestrator.status()?;
            println!("online:   {}", if status.online { "yes" } else { "no" });
            println!("pending:  {}", status.pending_count);
            println!("dead:     {}", status.dead_count);
            println!("circuit:  {}", status.circuit_state);
            match status.last_successful_sync_at {
                Some(at) => println!("last sync: {}", at.to_rfc3339()),
                None => println!("last sync: never"),
            }
        }
        Command::Sync => {
            let report = orchestrator.sync().await;
            print_report(&report);
        }
        Command::Dead => {
            let dead = orchestrator.queue().dead_entries()?;
            if dead.is_empty() {
                println!("no dead entries");
            } else {
                for entry in dead {
                    println!(
                        "{}  {}  attempts={}  {}",
                        entry.id, entry.kind, entry.attempts, entry.payload
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    match report.outcome {
        SyncOutcome::Offline => println!("offline, sync skipped"),
        SyncOutcome::AlreadyInProgress => println!("sync already in progress"),
        SyncOutcome::Completed => {
            println!(
                "uploaded {} downloaded {} in {}ms",
                report.uploaded, report.downloaded, report.duration_ms
            );
            for error in &report.errors {
                eprintln!("error: {error}");
            }
        }
    }
}
