//! Preview-specific error types.

use thiserror::Error;

use crate::domain::foundation::{ArticleSlug, PreviewSessionId};

/// Coarse classification of a [`PreviewError`].
///
/// Callers branch on the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewErrorKind {
    NotFound,
    CapacityExceeded,
    ConnectionFailed,
    Internal,
}

/// Errors raised by the preview session service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// No live session with this ID (never created, deleted or expired).
    #[error("preview session not found: {0}")]
    SessionNotFound(PreviewSessionId),

    /// The draft to preview does not exist.
    #[error("draft not found: {0}")]
    ArticleNotFound(ArticleSlug),

    /// Admission control refused a new session.
    #[error("preview session capacity exceeded ({capacity} active)")]
    CapacityExceeded { capacity: usize },

    /// A new viewer could not be sent its first message.
    #[error("viewer connection failed: {0}")]
    ConnectionFailed(String),

    /// Could not allocate a unique session ID.
    #[error("could not allocate a unique preview session id")]
    IdGeneration,
}

impl PreviewError {
    pub fn connection_failed(message: impl Into<String>) -> Self {
        PreviewError::ConnectionFailed(message.into())
    }

    pub fn kind(&self) -> PreviewErrorKind {
        match self {
            PreviewError::SessionNotFound(_) | PreviewError::ArticleNotFound(_) => {
                PreviewErrorKind::NotFound
            }
            PreviewError::CapacityExceeded { .. } => PreviewErrorKind::CapacityExceeded,
            PreviewError::ConnectionFailed(_) => PreviewErrorKind::ConnectionFailed,
            PreviewError::IdGeneration => PreviewErrorKind::Internal,
        }
    }

    /// True for outcomes that are part of normal operation.
    ///
    /// These are logged at debug/info rather than as errors.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind(),
            PreviewErrorKind::NotFound | PreviewErrorKind::CapacityExceeded
        )
    }
}
