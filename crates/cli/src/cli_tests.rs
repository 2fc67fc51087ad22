// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::Parser;

#[test]
fn parses_enqueue() {
    let cli = Cli::try_parse_from(["drift", "enqueue", "task.create", r#"{"title":"x"}"#]).unwrap();
    match cli.command {
        Command::Enqueue { kind, payload } => {
            assert_eq!(kind, "task.create");
            assert_eq!(payload, r#"{"title":"x"}"#);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_status_sync_dead() {
    assert!(matches!(
        Cli::try_parse_from(["drift", "status"]).unwrap().command,
        Command::Status
    ));
    assert!(matches!(
        Cli::try_parse_from(["drift", "sync"]).unwrap().command,
        Command::Sync
    ));
    assert!(matches!(
        Cli::try_parse_from(["drift", "dead"]).unwrap().command,
        Command::Dead
    ));
}

#[test]
fn config_flag_is_global() {
    let cli = Cli::try_parse_from(["drift", "status", "--config", "/tmp/drift.toml"]).unwrap();
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/drift.toml"))
    );
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["drift"]).is_err());
}

#[test]
fn enqueue_requires_kind_and_payload() {
    assert!(Cli::try_parse_from(["drift", "enqueue", "task.create"]).is_err());
}
