// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Offline-first sync client.
#[derive(Debug, Parser)]
#[command(name = "drift", version, about = "Queue mutations offline and sync them when connected")]
pub struct Cli {
    /// Path to the config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Queue a mutation for upload. Works offline.
    Enqueue {
        /// Kind tag for the mutation (e.g. "task.create").
        kind: String,
        /// JSON payload.
        payload: String,
    },
    /// Show queue, connectivity, and circuit state.
    Status,
    /// Run a single sync pass and exit.
    Sync,
    /// List dead-lettered entries awaiting manual resolution.
    Dead,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
