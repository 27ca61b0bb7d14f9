//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the preview core and the outside world. Adapters implement these ports.
//!
//! - `ArticleStore` - Draft lookup (filesystem, in-memory)
//! - `DraftChangeListener` - Save notifications from the editor or watcher
//! - `ViewerTransport` - Duplex stream to a viewer (WebSocket, channels)

mod article_store;
mod draft_change_listener;
mod viewer_transport;

pub use article_store::{ArticleStore, ArticleStoreError, Draft};
pub use draft_change_listener::DraftChangeListener;
pub use viewer_transport::{InboundFrame, TransportError, ViewerTransport};
