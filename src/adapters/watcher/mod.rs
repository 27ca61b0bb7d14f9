//! Filesystem watcher adapters.
//!
//! - **DraftWatcher** - Turns saves in the drafts directory into
//!   `DraftChangeListener` notifications

mod draft_watcher;

pub use draft_watcher::{DraftWatcher, WatchError, WATCH_DEBOUNCE};
