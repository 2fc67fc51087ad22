// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-server communication.
//!
//! The protocol is lockstep: the client sends one request and reads
//! frames until the matching response arrives. Mutations are acknowledged
//! or rejected per entry; deltas come back in a single batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drift_core::entry::{QueueEntry, RemoteRecord};
use drift_core::id::EntryId;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit one queued mutation.
    ///
    /// The server responds with `UploadAck` or `UploadRejected` carrying
    /// the same entry id.
    Upload {
        /// The mutation being replayed.
        entry: QueueEntry,
    },

    /// Request records changed since a given watermark.
    ///
    /// `None` requests everything, used by fresh clients.
    Deltas {
        /// Lower bound (exclusive) on server-side modification time.
        since: Option<DateTime<Utc>>,
    },

    /// Ping message for reachability probes.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The uploaded entry was accepted and durably applied.
    UploadAck {
        /// Id of the accepted entry.
        id: EntryId,
    },

    /// The uploaded entry was refused.
    ///
    /// `status` follows HTTP conventions: 4xx rejections are permanent,
    /// 5xx failures are transient.
    UploadRejected {
        /// Id of the refused entry.
        id: EntryId,
        /// HTTP-style status code classifying the refusal.
        status: u16,
        /// Human-readable reason.
        message: String,
        /// Server-requested minimum delay before retrying, for 429.
        #[serde(default)]
        retry_after_ms: Option<u64>,
    },

    /// Response to a Deltas request.
    DeltaBatch {
        /// Records changed since the requested watermark.
        records: Vec<RemoteRecord>,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Server-side failure unrelated to any specific request payload.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates an Upload message.
    pub fn upload(entry: QueueEntry) -> Self {
        ClientMessage::Upload { entry }
    }

    /// Creates a Deltas message.
    pub fn deltas(since: Option<DateTime<Utc>>) -> Self {
        ClientMessage::Deltas { since }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an UploadAck message.
    pub fn upload_ack(id: EntryId) -> Self {
        ServerMessage::UploadAck { id }
    }

    /// Creates an UploadRejected message.
    pub fn upload_rejected(id: EntryId, status: u16, message: impl Into<String>) -> Self {
        ServerMessage::UploadRejected {
            id,
            status,
            message: message.into(),
            retry_after_ms: None,
        }
    }

    /// Creates a DeltaBatch message.
    pub fn delta_batch(records: Vec<RemoteRecord>) -> Self {
        ServerMessage::DeltaBatch { records }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
