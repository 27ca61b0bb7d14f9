//! HTTP adapters - REST API implementations.

pub mod preview;

pub use preview::{preview_router, PreviewAppState};
