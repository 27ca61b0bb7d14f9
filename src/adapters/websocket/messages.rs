//! WebSocket message types for live preview updates.
//!
//! Defines the protocol between the server and a preview tab:
//! - Server → Client: connected, reload, expired
//! - Client → Server: ping

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ArticleSlug, PreviewSessionId, Timestamp};
use crate::domain::preview::CloseReason;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Viewer attached to its session.
    Connected(ConnectedMessage),

    /// The draft changed; the tab should refetch.
    Reload(ReloadMessage),

    /// The session is gone; a close frame follows.
    Expired(ExpiredMessage),
}

/// Sent once after the viewer attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub session_id: String,
    pub timestamp: String,
}

/// Sent when the previewed draft has been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadMessage {
    pub article_slug: String,
    pub timestamp: String,
}

/// Sent right before a server-initiated close on delete or expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredMessage {
    pub reason: String,
    pub timestamp: String,
}

impl ServerMessage {
    pub fn connected(session_id: &PreviewSessionId) -> Self {
        ServerMessage::Connected(ConnectedMessage {
            session_id: session_id.to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn reload(article_slug: &ArticleSlug) -> Self {
        ServerMessage::Reload(ReloadMessage {
            article_slug: article_slug.to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn expired(reason: CloseReason) -> Self {
        ServerMessage::Expired(ExpiredMessage {
            reason: reason.to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    /// JSON text frame payload.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat; refreshes the session's activity time.
    Ping,
}
