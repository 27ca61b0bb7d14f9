//! Article Store Port - Read access to drafts.
//!
//! The preview service never renders or persists articles. It only needs
//! to know whether a draft exists and, for the preview page, its content.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ArticleSlug;

/// A draft as seen by the preview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub slug: ArticleSlug,
    pub title: String,
    /// Raw markdown body, front matter removed.
    pub body: String,
}

/// Errors from article store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleStoreError {
    /// No article with this slug.
    #[error("article not found: {0}")]
    NotFound(ArticleSlug),

    /// The article exists but is published, not a draft.
    #[error("article is not a draft: {0}")]
    NotADraft(ArticleSlug),

    /// Underlying storage failed.
    #[error("storage error: {0}")]
    Io(String),

    /// Front matter could not be parsed.
    #[error("invalid front matter in {file}: {message}")]
    FrontMatter { file: String, message: String },
}

/// Port for looking up drafts by slug.
///
/// # Contract
///
/// Implementations must:
/// - Treat a slug that vanished mid-preview as `NotFound`, never panic
/// - Only report unpublished drafts from `draft_exists`
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Returns true if an unpublished draft with this slug exists.
    ///
    /// Storage failures count as "does not exist" and are logged.
    async fn draft_exists(&self, slug: &ArticleSlug) -> bool {
        match self.get_draft(slug).await {
            Ok(_) => true,
            Err(ArticleStoreError::NotFound(_)) | Err(ArticleStoreError::NotADraft(_)) => false,
            Err(e) => {
                tracing::warn!(article_slug = %slug, error = %e, "Draft lookup failed");
                false
            }
        }
    }

    /// Loads the draft with this slug.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no article has this slug
    /// - `NotADraft` if the article is already published
    async fn get_draft(&self, slug: &ArticleSlug) -> Result<Draft, ArticleStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore(Result<Draft, ArticleStoreError>);

    #[async_trait]
    impl ArticleStore for FixedStore {
        async fn get_draft(&self, _slug: &ArticleSlug) -> Result<Draft, ArticleStoreError> {
            self.0.clone()
        }
    }

    fn slug() -> ArticleSlug {
        ArticleSlug::new("my-draft").unwrap()
    }

    #[tokio::test]
    async fn draft_exists_only_for_loadable_drafts() {
        let draft = Draft {
            slug: slug(),
            title: "Title".to_string(),
            body: "Body".to_string(),
        };
        assert!(FixedStore(Ok(draft)).draft_exists(&slug()).await);
        assert!(
            !FixedStore(Err(ArticleStoreError::NotFound(slug())))
                .draft_exists(&slug())
                .await
        );
        assert!(
            !FixedStore(Err(ArticleStoreError::NotADraft(slug())))
                .draft_exists(&slug())
                .await
        );
    }

    #[tokio::test]
    async fn storage_failure_counts_as_missing_draft() {
        let store = FixedStore(Err(ArticleStoreError::Io("permission denied".to_string())));
        assert!(!store.draft_exists(&slug()).await);

        let store = FixedStore(Err(ArticleStoreError::FrontMatter {
            file: "my-draft.md".to_string(),
            message: "bad yaml".to_string(),
        }));
        assert!(!store.draft_exists(&slug()).await);
    }
}
