//! Why a viewer connection is being closed by the server.

use std::fmt;

/// Server-side reason for tearing down a viewer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Another viewer attached to the same session.
    Superseded,
    /// The session was deleted explicitly.
    Deleted,
    /// The sweeper removed the session.
    Expired,
    /// The process is shutting down.
    Shutdown,
    /// The session did not exist at attach time.
    SessionNotFound,
}

impl CloseReason {
    /// WebSocket close code sent with the close frame.
    pub fn close_code(&self) -> u16 {
        match self {
            CloseReason::Superseded => 4000,
            CloseReason::Deleted | CloseReason::Expired => 1000,
            CloseReason::Shutdown => 1001,
            CloseReason::SessionNotFound => 4404,
        }
    }

    /// Human-readable close reason sent with the close frame.
    pub fn close_message(&self) -> &'static str {
        match self {
            CloseReason::Superseded => "superseded by new connection",
            CloseReason::Deleted => "preview session deleted",
            CloseReason::Expired => "preview session expired",
            CloseReason::Shutdown => "server shutting down",
            CloseReason::SessionNotFound => "preview session not found",
        }
    }

    /// Whether the viewer is told the session is gone before the close.
    pub fn sends_expired_notice(&self) -> bool {
        matches!(self, CloseReason::Deleted | CloseReason::Expired)
    }

    /// Value of the `reason` field in the `expired` message.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::Superseded => "superseded",
            CloseReason::Deleted => "deleted",
            CloseReason::Expired => "expired",
            CloseReason::Shutdown => "shutdown",
            CloseReason::SessionNotFound => "not_found",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
