//! Draft Change Listener Port - Entry point for the editing subsystem.

use async_trait::async_trait;

use crate::domain::foundation::ArticleSlug;

/// Notified after a draft has been saved.
///
/// Implementations must return promptly; callers sit on the save path.
#[async_trait]
pub trait DraftChangeListener: Send + Sync {
    /// The draft with `slug` changed on disk or in the editor.
    async fn draft_changed(&self, slug: &ArticleSlug);
}
