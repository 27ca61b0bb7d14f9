//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the preview core to external systems:
//! - `http` - REST endpoints and the preview page
//! - `storage` - Draft stores (filesystem, in-memory)
//! - `watcher` - Drafts directory watching
//! - `websocket` - Live viewer connections

pub mod http;
pub mod storage;
pub mod watcher;
pub mod websocket;

pub use http::{preview_router, PreviewAppState};
pub use storage::{FsArticleStore, InMemoryArticleStore};
pub use watcher::DraftWatcher;
pub use websocket::{attach, OriginPolicy};
