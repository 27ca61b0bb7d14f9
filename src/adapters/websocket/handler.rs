//! WebSocket upgrade handler for live preview connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the socket to the
//! connection adapter:
//! 1. Check the `Origin` header
//! 2. Check the session exists (404 before upgrading)
//! 3. Upgrade to WebSocket
//! 4. Run [`attach`] until the viewer leaves or is evicted

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::preview::{ErrorResponse, PreviewAppState};
use crate::domain::foundation::PreviewSessionId;

use super::connection::attach;

/// Handle WebSocket upgrade requests for a preview session.
///
/// Route: `GET /api/preview/ws/:id`
pub async fn preview_ws_handler(
    ws: Option<WebSocketUpgrade>,
    Path(session_id): Path<String>,
    State(state): State<PreviewAppState>,
    headers: HeaderMap,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.origins.is_allowed(origin) {
        tracing::warn!(session_id = %session_id, origin = ?origin, "Rejected preview socket origin");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::forbidden("Origin not allowed")),
        )
            .into_response();
    }

    let session_id: PreviewSessionId = match session_id.parse() {
        Ok(id) => id,
        Err(_) => return not_found(&session_id),
    };
    if state.registry.get_session(&session_id).await.is_err() {
        return not_found(session_id.as_str());
    }

    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(ErrorResponse::upgrade_required("Expected a WebSocket upgrade")),
        )
            .into_response();
    };

    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| async move {
        // The session may have gone between the check and the upgrade;
        // attach then closes the socket with 4404.
        match attach(&registry, &session_id, socket).await {
            Ok(_) => {}
            Err(e) if e.is_expected() => {
                tracing::debug!(session_id = %session_id, error = %e, "Preview socket closed early");
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Preview socket failed");
            }
        }
    })
}

fn not_found(session_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found("Preview session", session_id)),
    )
        .into_response()
}
