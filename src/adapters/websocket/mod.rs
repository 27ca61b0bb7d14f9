//! WebSocket adapters for live preview updates.
//!
//! # Architecture
//!
//! ```text
//!  editor save / drafts watcher
//!              │ notify_changed(slug)
//!              ▼
//! ┌──────────────────────────────────────────┐
//! │             SessionRegistry              │
//! │  session_a ── [signal] ── viewer task    │
//! │  session_b ── [signal] ── (no viewer)    │
//! └──────────────────────────────────────────┘
//!              │ reload / expired / close
//!              ▼
//!      ViewerTransport (WebSocket)
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`connection`] - Per-viewer read/write loop
//! - [`transport`] - `ViewerTransport` for axum sockets and channels
//! - [`origin`] - Origin allow-list for upgrades
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod connection;
pub mod handler;
pub mod messages;
pub mod origin;
pub mod transport;

pub use connection::{attach, ViewerExit, CLOSE_TIMEOUT};
pub use handler::preview_ws_handler;
pub use messages::{ClientMessage, ConnectedMessage, ExpiredMessage, ReloadMessage, ServerMessage};
pub use origin::OriginPolicy;
pub use transport::{channel_transport, ChannelPeer, ChannelTransport, OutboundFrame};
