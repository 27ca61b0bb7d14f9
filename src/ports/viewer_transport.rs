//! Viewer Transport Port - Duplex text stream to a preview viewer.
//!
//! The connection loop is written against this trait so it can run over
//! an axum WebSocket in production and over channels in tests.

use async_trait::async_trait;
use thiserror::Error;

/// A frame received from the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

/// Transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer is gone.
    #[error("connection closed")]
    Closed,

    /// Read or write failed.
    #[error("transport error: {0}")]
    Io(String),
}

/// Port for a live connection to one viewer.
#[async_trait]
pub trait ViewerTransport: Send {
    /// Sends one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Waits for the next inbound frame; `None` once the stream has ended.
    ///
    /// Must be cancel-safe: it is polled inside `tokio::select!`.
    async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>>;

    /// Sends a close frame with `code` and `reason`.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError>;
}
