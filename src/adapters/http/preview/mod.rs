//! HTTP adapter for preview session endpoints.
//!
//! Exposes the preview registry via REST, serves the preview page shell
//! and mounts the live WebSocket endpoint.

mod dto;
mod handlers;
mod page;
mod routes;

pub use dto::{
    CreatePreviewSessionRequest, ErrorResponse, MessageResponse, PreviewSessionEnvelope,
    PreviewSessionResponse, PreviewStatsResponse, PreviewStatusResponse,
};
pub use handlers::{
    create_preview_session, delete_preview_session, get_preview_session, get_preview_status,
    preview_page, PreviewAppState,
};
pub use page::escape_html;
pub use routes::preview_router;
