// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for drift-core operations.
//!
//! Two layers:
//! - [`ErrorKind`] classifies remote-call failures and drives the retry
//!   policy. It is what the ConnectionManager returns and what sync runs
//!   collect for status reporting.
//! - [`Error`] covers everything else (storage, serialization, lookups).

use thiserror::Error;

/// Classified failure for a remote operation.
///
/// Retryable kinds are retried by the ConnectionManager with exponential
/// backoff; non-retryable kinds fail the call immediately and are surfaced
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Transport-level failure (connection refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The call did not complete within the configured timeout.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// The server asked us to slow down.
    ///
    /// `retry_after_ms` carries the server-provided hint, honored as a
    /// minimum backoff before the next attempt.
    #[error("rate limited")]
    RateLimited {
        /// Server-provided minimum delay before retrying, if any.
        retry_after_ms: Option<u64>,
    },

    /// Server-side failure (5xx class).
    #[error("server error: status {0}")]
    Server(u16),

    /// Credentials are missing or expired. Surfaced for re-authentication.
    #[error("authentication required")]
    Authentication,

    /// The caller is not allowed to perform this operation.
    #[error("not authorized")]
    Authorization,

    /// The server rejected the payload as malformed (4xx class).
    ///
    /// Indicates a bad queued entry; retrying will never succeed.
    #[error("rejected by server: {0}")]
    Validation(String),

    /// The circuit breaker is open; the call was not attempted.
    ///
    /// Non-retryable for this call, but the entry stays queued for a
    /// future run.
    #[error("circuit breaker is open")]
    CircuitOpen,

    /// Local durable storage failed mid-run.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ErrorKind {
    /// Returns true if the ConnectionManager may retry this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network(_)
                | ErrorKind::Timeout(_)
                | ErrorKind::RateLimited { .. }
                | ErrorKind::Server(_)
        )
    }

    /// Returns the server-provided minimum retry delay, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ErrorKind::RateLimited { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}

/// All possible errors that can occur in drift-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("remote call failed: {0}")]
    Remote(ErrorKind),

    #[error("queue entry not found: {0}")]
    EntryNotFound(String),

    #[error("invalid entry id: {0}")]
    InvalidEntryId(String),

    #[error("corrupted record: {0}")]
    CorruptedRecord(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for drift-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
