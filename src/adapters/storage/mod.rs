//! Storage Adapters
//!
//! Implementations of the ArticleStore port.
//!
//! ## Available Adapters
//!
//! - **FsArticleStore** - Reads markdown drafts from a directory
//! - **InMemoryArticleStore** - Holds drafts in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FsArticleStore, InMemoryArticleStore};
//!
//! // Production: markdown directory
//! let store = FsArticleStore::new("./drafts");
//!
//! // Testing: in-memory store
//! let store = InMemoryArticleStore::new();
//! ```

mod fs_article_store;
mod in_memory_article_store;

pub use fs_article_store::FsArticleStore;
pub use in_memory_article_store::InMemoryArticleStore;
