//! ViewerTransport implementations.
//!
//! - axum [`WebSocket`] for real browser tabs
//! - [`ChannelTransport`] backed by unbounded channels, for tests and
//!   embedding without a socket

use std::borrow::Cow;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use tokio::sync::mpsc;

use crate::ports::{InboundFrame, TransportError, ViewerTransport};

use super::messages::ServerMessage;

#[async_trait]
impl ViewerTransport for WebSocket {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        WebSocket::send(self, Message::Text(text))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        let message = WebSocket::recv(self).await?;
        Some(
            message
                .map(|message| match message {
                    Message::Text(text) => InboundFrame::Text(text),
                    Message::Binary(data) => InboundFrame::Binary(data),
                    Message::Ping(_) => InboundFrame::Ping,
                    Message::Pong(_) => InboundFrame::Pong,
                    Message::Close(_) => InboundFrame::Close,
                })
                .map_err(|e| TransportError::Io(e.to_string())),
        )
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code,
            reason: Cow::Owned(reason.to_string()),
        };
        WebSocket::send(self, Message::Close(Some(frame)))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

/// A frame the server wrote to a [`ChannelTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close { code: u16, reason: String },
}

impl OutboundFrame {
    /// Parses a text frame as a server message.
    pub fn as_message(&self) -> Option<ServerMessage> {
        match self {
            OutboundFrame::Text(text) => serde_json::from_str(text).ok(),
            OutboundFrame::Close { .. } => None,
        }
    }
}

/// Server side of an in-memory viewer connection.
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

/// Client side of an in-memory viewer connection.
pub struct ChannelPeer {
    outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    inbound: mpsc::UnboundedSender<InboundFrame>,
}

/// Creates a connected transport/peer pair.
pub fn channel_transport() -> (ChannelTransport, ChannelPeer) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    (
        ChannelTransport {
            outbound: outbound_tx,
            inbound: inbound_rx,
        },
        ChannelPeer {
            outbound: outbound_rx,
            inbound: inbound_tx,
        },
    )
}

#[async_trait]
impl ViewerTransport for ChannelTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(OutboundFrame::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError> {
        self.outbound
            .send(OutboundFrame::Close {
                code,
                reason: reason.to_string(),
            })
            .map_err(|_| TransportError::Closed)
    }
}

impl ChannelPeer {
    /// Sends a frame to the server; false once the server side is gone.
    pub fn send(&self, frame: InboundFrame) -> bool {
        self.inbound.send(frame).is_ok()
    }

    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.send(InboundFrame::Text(text.into()))
    }

    /// Waits for the next frame written by the server.
    pub async fn recv(&mut self) -> Option<OutboundFrame> {
        self.outbound.recv().await
    }

    /// Returns a frame if one is already buffered.
    pub fn try_recv(&mut self) -> Option<OutboundFrame> {
        self.outbound.try_recv().ok()
    }
}
