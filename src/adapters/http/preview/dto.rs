//! HTTP DTOs for preview session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::preview::{PreviewSession, PreviewStats};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to open a preview session for a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePreviewSessionRequest {
    pub article_slug: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Preview session view for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSessionResponse {
    pub id: String,
    pub article_slug: String,
    pub url: String,
    pub created_at: String,
    pub last_activity_at: String,
    pub viewer_connected: bool,
}

impl From<PreviewSession> for PreviewSessionResponse {
    fn from(session: PreviewSession) -> Self {
        Self {
            id: session.id().to_string(),
            article_slug: session.article_slug().to_string(),
            url: session.url().to_string(),
            created_at: session.created_at().to_rfc3339(),
            last_activity_at: session.last_activity_at().to_rfc3339(),
            viewer_connected: session.viewer_connected(),
        }
    }
}

/// `{ "session": ... }` wrapper used by create and get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSessionEnvelope {
    pub session: PreviewSessionResponse,
}

impl From<PreviewSession> for PreviewSessionEnvelope {
    fn from(session: PreviewSession) -> Self {
        Self {
            session: session.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewStatsResponse {
    pub active_sessions: usize,
    pub capacity: usize,
    pub connected_viewers: usize,
}

impl From<PreviewStats> for PreviewStatsResponse {
    fn from(stats: PreviewStats) -> Self {
        Self {
            active_sessions: stats.active_sessions,
            capacity: stats.capacity,
            connected_viewers: stats.connected_viewers,
        }
    }
}

/// Admin dashboard view of the preview service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewStatusResponse {
    pub stats: PreviewStatsResponse,
    pub service_running: bool,
}

/// Response for commands without a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new("CAPACITY_EXCEEDED", message)
    }

    pub fn upgrade_required(message: impl Into<String>) -> Self {
        Self::new("UPGRADE_REQUIRED", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new("CONNECTION_FAILED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
