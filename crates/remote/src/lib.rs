// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! drift-remote: WebSocket backend for the drift sync layer
//!
//! Implements drift-core's `RemoteBackend` over a tokio-tungstenite
//! connection and defines the wire protocol shared with the server.

pub mod backend;
pub mod protocol;

pub use backend::WebSocketBackend;
pub use protocol::{ClientMessage, ServerMessage};
