// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! drift: offline-first sync client CLI.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;

use crate::cli::Cli;
use crate::config::FileConfig;

#[tokio::main]
async fn main() {
    setup_logging();

    let cli = Cli::parse();
    let config = match FileConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = commands::run(config, cli.command).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
