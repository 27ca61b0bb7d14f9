//! HTTP handlers for preview session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::adapters::websocket::OriginPolicy;
use crate::application::preview::SessionRegistry;
use crate::domain::foundation::{ArticleSlug, PreviewSessionId};
use crate::domain::preview::{PreviewError, PreviewErrorKind};
use crate::ports::{ArticleStore, ArticleStoreError};

use super::dto::{
    CreatePreviewSessionRequest, ErrorResponse, MessageResponse, PreviewSessionEnvelope,
    PreviewStatusResponse,
};
use super::page::{render_preview_page, render_unavailable_page};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for preview routes.
#[derive(Clone)]
pub struct PreviewAppState {
    pub registry: Arc<SessionRegistry>,
    pub articles: Arc<dyn ArticleStore>,
    pub origins: Arc<OriginPolicy>,
}

impl PreviewAppState {
    pub fn new(
        registry: Arc<SessionRegistry>,
        articles: Arc<dyn ArticleStore>,
        origins: OriginPolicy,
    ) -> Self {
        Self {
            registry,
            articles,
            origins: Arc::new(origins),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/preview/sessions - Open a preview session for a draft
pub async fn create_preview_session(
    State(state): State<PreviewAppState>,
    Json(req): Json<CreatePreviewSessionRequest>,
) -> Response {
    let slug = match ArticleSlug::new(req.article_slug) {
        Ok(slug) => slug,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response()
        }
    };

    match state.registry.create_session(&slug).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(PreviewSessionEnvelope::from(session)),
        )
            .into_response(),
        Err(e) => handle_preview_error(e),
    }
}

/// GET /api/preview/sessions - Service status for the admin dashboard
pub async fn get_preview_status(State(state): State<PreviewAppState>) -> Response {
    let response = PreviewStatusResponse {
        stats: state.registry.stats().await.into(),
        service_running: state.registry.is_running(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/preview/sessions/:id - Get session details
pub async fn get_preview_session(
    State(state): State<PreviewAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return session_not_found(&session_id);
    };

    match state.registry.get_session(&session_id).await {
        Ok(session) => (StatusCode::OK, Json(PreviewSessionEnvelope::from(session))).into_response(),
        Err(e) => handle_preview_error(e),
    }
}

/// DELETE /api/preview/sessions/:id - End a preview session
pub async fn delete_preview_session(
    State(state): State<PreviewAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return session_not_found(&session_id);
    };

    match state.registry.delete_session(&session_id).await {
        Ok(()) => {
            let response = MessageResponse {
                message: "Preview session deleted".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_preview_error(e),
    }
}

/// GET /preview/:id - HTML preview shell
pub async fn preview_page(
    State(state): State<PreviewAppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(session_id) = parse_session_id(&session_id) else {
        return unavailable(StatusCode::NOT_FOUND, "This preview link is invalid or has expired.");
    };

    let session = match state.registry.get_session(&session_id).await {
        Ok(session) => session,
        Err(_) => {
            return unavailable(StatusCode::NOT_FOUND, "This preview link is invalid or has expired.")
        }
    };
    state.registry.touch(&session_id).await;

    match state.articles.get_draft(session.article_slug()).await {
        Ok(draft) => Html(render_preview_page(&session, &draft)).into_response(),
        Err(ArticleStoreError::NotFound(_)) | Err(ArticleStoreError::NotADraft(_)) => {
            tracing::debug!(
                session_id = %session_id,
                article_slug = %session.article_slug(),
                "Previewed draft no longer available"
            );
            unavailable(StatusCode::NOT_FOUND, "This draft is no longer available.")
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Failed to load draft for preview");
            unavailable(StatusCode::INTERNAL_SERVER_ERROR, "The draft could not be loaded.")
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Option<PreviewSessionId> {
    raw.parse().ok()
}

/// Malformed IDs are indistinguishable from unknown ones.
fn session_not_found(raw: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Preview session", raw)),
    )
        .into_response()
}

fn unavailable(status: StatusCode, message: &str) -> Response {
    (status, Html(render_unavailable_page(message))).into_response()
}

/// Maps preview errors to HTTP responses by kind.
pub(crate) fn handle_preview_error(error: PreviewError) -> Response {
    if error.is_expected() {
        tracing::debug!(error = %error, "Preview request refused");
    } else {
        tracing::error!(error = %error, "Preview request failed");
    }

    match error.kind() {
        PreviewErrorKind::NotFound => {
            let response = match &error {
                PreviewError::ArticleNotFound(slug) => {
                    ErrorResponse::not_found("Draft", slug.as_str())
                }
                PreviewError::SessionNotFound(id) => {
                    ErrorResponse::not_found("Preview session", id.as_str())
                }
                other => ErrorResponse::not_found("Resource", &other.to_string()),
            };
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
        PreviewErrorKind::CapacityExceeded => {
            let mut response = ErrorResponse::too_many_requests(error.to_string());
            if let PreviewError::CapacityExceeded { capacity } = error {
                response = response.with_details(serde_json::json!({ "capacity": capacity }));
            }
            (StatusCode::TOO_MANY_REQUESTS, Json(response)).into_response()
        }
        PreviewErrorKind::ConnectionFailed => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::bad_gateway(error.to_string())),
        )
            .into_response(),
        PreviewErrorKind::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal(error.to_string())),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_status_codes() {
        let slug = ArticleSlug::new("gone").unwrap();
        assert_eq!(
            handle_preview_error(PreviewError::ArticleNotFound(slug)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            handle_preview_error(PreviewError::CapacityExceeded { capacity: 1 }).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            handle_preview_error(PreviewError::connection_failed("reset")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            handle_preview_error(PreviewError::IdGeneration).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_session_ids_do_not_parse() {
        assert!(parse_session_id("../../etc").is_none());
        assert!(parse_session_id("session_xyz").is_none());
    }
}
