//! Route configuration for preview endpoints.

use axum::routing::get;
use axum::Router;

use crate::adapters::websocket::preview_ws_handler;

use super::handlers::{
    create_preview_session, delete_preview_session, get_preview_session, get_preview_status,
    preview_page, PreviewAppState,
};

/// Creates the preview router with all endpoints.
///
/// Routes:
/// - `POST /api/preview/sessions` - Open a preview session
/// - `GET /api/preview/sessions` - Stats and service status
/// - `GET /api/preview/sessions/:id` - Session details
/// - `DELETE /api/preview/sessions/:id` - End a session
/// - `GET /api/preview/ws/:id` - Live update WebSocket
/// - `GET /preview/:id` - Preview page shell
pub fn preview_router() -> Router<PreviewAppState> {
    Router::new()
        .route(
            "/api/preview/sessions",
            get(get_preview_status).post(create_preview_session),
        )
        .route(
            "/api/preview/sessions/:id",
            get(get_preview_session).delete(delete_preview_session),
        )
        .route("/api/preview/ws/:id", get(preview_ws_handler))
        .route("/preview/:id", get(preview_page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryArticleStore;
    use crate::adapters::websocket::OriginPolicy;
    use crate::application::preview::{RegistrySettings, SessionRegistry};
    use crate::domain::foundation::ArticleSlug;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_with_capacity(capacity: usize) -> PreviewAppState {
        let store = InMemoryArticleStore::new()
            .with_draft(ArticleSlug::new("my-draft").unwrap(), "My <Draft>", "Hello & bye")
            .with_draft(ArticleSlug::new("other").unwrap(), "Other", "Body");
        let articles = Arc::new(store);
        let registry = Arc::new(SessionRegistry::new(
            articles.clone(),
            RegistrySettings::default().with_capacity(capacity),
        ));
        PreviewAppState::new(registry, articles, OriginPolicy::default())
    }

    async fn send(state: &PreviewAppState, request: Request<Body>) -> Response {
        preview_router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_request(slug: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/preview/sessions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"article_slug":"{}"}}"#, slug)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn create(state: &PreviewAppState, slug: &str) -> String {
        let response = send(state, create_request(slug)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        body["session"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_returns_session_with_url() {
        let state = state_with_capacity(5);
        let response = send(&state, create_request("my-draft")).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let id = body["session"]["id"].as_str().unwrap();
        assert_eq!(body["session"]["article_slug"], "my-draft");
        assert_eq!(body["session"]["url"], format!("/preview/{}", id));
    }

    #[tokio::test]
    async fn create_rejects_invalid_slug() {
        let state = state_with_capacity(5);
        let response = send(&state, create_request("Not A Slug")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn create_for_unknown_draft_is_404() {
        let state = state_with_capacity(5);
        let response = send(&state, create_request("missing")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_at_capacity_is_429() {
        let state = state_with_capacity(1);
        create(&state, "my-draft").await;

        let response = send(&state, create_request("other")).await;

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(response).await["details"]["capacity"], 1);
    }

    #[tokio::test]
    async fn status_reports_stats_and_running_flag() {
        let state = state_with_capacity(5);
        create(&state, "my-draft").await;

        let response = send(&state, get("/api/preview/sessions")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["stats"]["active_sessions"], 1);
        assert_eq!(body["stats"]["capacity"], 5);
        assert_eq!(body["stats"]["connected_viewers"], 0);
        assert_eq!(body["service_running"], true);
    }

    #[tokio::test]
    async fn get_and_delete_session() {
        let state = state_with_capacity(5);
        let id = create(&state, "my-draft").await;
        let uri = format!("/api/preview/sessions/{}", id);

        let response = send(&state, get(&uri)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let response = send(&state, delete).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], "Preview session deleted");

        let response = send(&state, get(&uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_session_id_is_404() {
        let state = state_with_capacity(5);
        let response = send(&state, get("/api/preview/sessions/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preview_page_renders_escaped_draft() {
        let state = state_with_capacity(5);
        let id = create(&state, "my-draft").await;

        let response = send(&state, get(&format!("/preview/{}", id))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("My &lt;Draft&gt;"));
        assert!(html.contains("Hello &amp; bye"));
    }

    #[tokio::test]
    async fn preview_page_for_unknown_session_is_404() {
        let state = state_with_capacity(5);
        let response = send(&state, get("/preview/session_00000000000000000000000000000000")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ws_rejects_foreign_origin() {
        let state = state_with_capacity(5);
        let id = create(&state, "my-draft").await;

        let request = Request::builder()
            .uri(format!("/api/preview/ws/{}", id))
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn ws_for_unknown_session_is_404() {
        let state = state_with_capacity(5);
        let request = Request::builder()
            .uri("/api/preview/ws/session_00000000000000000000000000000000")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ws_without_upgrade_is_426() {
        let state = state_with_capacity(5);
        let id = create(&state, "my-draft").await;

        let request = Request::builder()
            .uri(format!("/api/preview/ws/{}", id))
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = send(&state, request).await;

        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    }
}
