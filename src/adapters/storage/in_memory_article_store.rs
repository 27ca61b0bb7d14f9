//! In-Memory Article Store Adapter
//!
//! Holds drafts in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ArticleSlug;
use crate::ports::{ArticleStore, ArticleStoreError, Draft};

#[derive(Debug, Clone)]
struct StoredArticle {
    draft: Draft,
    published: bool,
}

/// In-memory article store
#[derive(Debug, Clone, Default)]
pub struct InMemoryArticleStore {
    articles: Arc<RwLock<HashMap<ArticleSlug, StoredArticle>>>,
}

impl InMemoryArticleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for setting up fixtures without awaiting.
    pub fn with_draft(self, slug: ArticleSlug, title: &str, body: &str) -> Self {
        let article = stored(slug.clone(), title, body);
        if let Ok(mut articles) = self.articles.try_write() {
            articles.insert(slug, article);
        }
        self
    }

    /// Insert or replace a draft
    pub async fn insert_draft(&self, slug: ArticleSlug, title: &str, body: &str) {
        let article = stored(slug.clone(), title, body);
        self.articles.write().await.insert(slug, article);
    }

    /// Mark an article as published; it stops counting as a draft
    pub async fn publish(&self, slug: &ArticleSlug) {
        if let Some(article) = self.articles.write().await.get_mut(slug) {
            article.published = true;
        }
    }

    /// Remove an article entirely
    pub async fn remove(&self, slug: &ArticleSlug) {
        self.articles.write().await.remove(slug);
    }
}

fn stored(slug: ArticleSlug, title: &str, body: &str) -> StoredArticle {
    StoredArticle {
        draft: Draft {
            slug,
            title: title.to_string(),
            body: body.to_string(),
        },
        published: false,
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn get_draft(&self, slug: &ArticleSlug) -> Result<Draft, ArticleStoreError> {
        let articles = self.articles.read().await;
        match articles.get(slug) {
            Some(article) if article.published => Err(ArticleStoreError::NotADraft(slug.clone())),
            Some(article) => Ok(article.draft.clone()),
            None => Err(ArticleStoreError::NotFound(slug.clone())),
        }
    }
}
