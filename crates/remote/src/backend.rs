// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket implementation of [`RemoteBackend`] using tokio-tungstenite.
//!
//! The connection is established lazily on the first call and dropped on
//! any transport error, so the next call reconnects. Retry policy lives in
//! the ConnectionManager; this layer only executes single attempts and
//! classifies their failures.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use drift_core::entry::{QueueEntry, RemoteRecord};
use drift_core::error::ErrorKind;
use drift_core::remote::{RemoteBackend, RemoteFuture};

use crate::protocol::{ClientMessage, ServerMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Maps an upload rejection to the retry taxonomy.
fn reject_kind(status: u16, message: String, retry_after_ms: Option<u64>) -> ErrorKind {
    match status {
        401 => ErrorKind::Authentication,
        403 => ErrorKind::Authorization,
        429 => ErrorKind::RateLimited { retry_after_ms },
        400..=499 => ErrorKind::Validation(message),
        _ => ErrorKind::Server(status),
    }
}

/// WebSocket-backed remote endpoint.
pub struct WebSocketBackend {
    url: String,
    conn: Mutex<Option<WsStream>>,
    ping_id: AtomicU64,
}

impl WebSocketBackend {
    /// Creates a backend for the given `ws://` or `wss://` URL.
    ///
    /// No connection is made until the first call.
    pub fn new(url: impl Into<String>) -> Self {
        WebSocketBackend {
            url: url.into(),
            conn: Mutex::new(None),
            ping_id: AtomicU64::new(0),
        }
    }

    /// Sends one request and reads frames until a response message
    /// arrives. Any transport error drops the connection.
    async fn request(&self, msg: ClientMessage) -> Result<ServerMessage, ErrorKind> {
        let json = msg
            .to_json()
            .map_err(|e| ErrorKind::Validation(format!("unencodable request: {e}")))?;

        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            tracing::debug!(url = %self.url, "connecting");
            let (ws, _) = connect_async(&self.url)
                .await
                .map_err(|e| ErrorKind::Network(e.to_string()))?;
            *guard = Some(ws);
        }

        let result = match guard.as_mut() {
            Some(ws) => Self::roundtrip(ws, json).await,
            None => Err(ErrorKind::Network("not connected".into())),
        };
        if result.is_err() {
            *guard = None;
        }
        result
    }

    async fn roundtrip(ws: &mut WsStream, json: String) -> Result<ServerMessage, ErrorKind> {
        ws.send(Message::Text(json.into()))
            .await
            .map_err(|e| ErrorKind::Network(e.to_string()))?;

        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return ServerMessage::from_json(&text)
                        .map_err(|e| ErrorKind::Network(format!("malformed response: {e}")));
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ErrorKind::Network("connection closed".into()));
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(ErrorKind::Network(e.to_string())),
            }
        }
    }
}

impl RemoteBackend for WebSocketBackend {
    fn upload<'a>(&'a self, entry: &'a QueueEntry) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            match self.request(ClientMessage::upload(entry.clone())).await? {
                ServerMessage::UploadAck { id } if id == entry.id => Ok(()),
                ServerMessage::UploadRejected {
                    status,
                    message,
                    retry_after_ms,
                    ..
                } => Err(reject_kind(status, message, retry_after_ms)),
                ServerMessage::Error { message } => {
                    tracing::warn!(%message, "server error during upload");
                    Err(ErrorKind::Server(500))
                }
                other => Err(ErrorKind::Network(format!(
                    "protocol error: unexpected response {other:?}"
                ))),
            }
        })
    }

    fn fetch_deltas(&self, since: Option<DateTime<Utc>>) -> RemoteFuture<'_, Vec<RemoteRecord>> {
        Box::pin(async move {
            match self.request(ClientMessage::deltas(since)).await? {
                ServerMessage::DeltaBatch { records } => Ok(records),
                ServerMessage::Error { message } => {
                    tracing::warn!(%message, "server error during delta fetch");
                    Err(ErrorKind::Server(500))
                }
                other => Err(ErrorKind::Network(format!(
                    "protocol error: unexpected response {other:?}"
                ))),
            }
        })
    }

    fn probe(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let id = self.ping_id.fetch_add(1, Ordering::Relaxed);
            match self.request(ClientMessage::ping(id)).await? {
                ServerMessage::Pong { id: echoed } if echoed == id => Ok(()),
                other => Err(ErrorKind::Network(format!(
                    "protocol error: unexpected response {other:?}"
                ))),
            }
        })
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
