//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and validation errors
//! that form the vocabulary of the preview domain.

mod errors;
mod ids;
mod slug;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{PreviewSessionId, ViewerId};
pub use slug::{ArticleSlug, MAX_SLUG_LEN};
pub use timestamp::Timestamp;
