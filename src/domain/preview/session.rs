//! Preview session record and expiry rules.

use std::time::Duration;

use crate::domain::foundation::{ArticleSlug, PreviewSessionId, Timestamp};

/// Path segment under which preview pages are served.
const PREVIEW_PATH: &str = "/preview/";

/// When a session is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Longest allowed gap since the last viewer activity.
    pub idle_timeout: Duration,
    /// Longest allowed lifetime regardless of activity.
    pub max_age: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(15 * 60),
            max_age: Duration::from_secs(2 * 60 * 60),
        }
    }
}

/// A short-lived, tokenized grant to preview one draft.
///
/// # Invariants
///
/// - `id` is unique among live sessions
/// - `article_slug` never changes after creation
/// - `last_activity_at` is never before `created_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSession {
    id: PreviewSessionId,
    article_slug: ArticleSlug,
    url: String,
    created_at: Timestamp,
    last_activity_at: Timestamp,
    viewer_connected: bool,
}

impl PreviewSession {
    /// Creates a fresh session; the URL is `base_url + "/preview/" + id`.
    pub fn new(id: PreviewSessionId, article_slug: ArticleSlug, base_url: &str) -> Self {
        Self::new_at(id, article_slug, base_url, Timestamp::now())
    }

    /// Creates a session with an explicit creation time.
    pub fn new_at(
        id: PreviewSessionId,
        article_slug: ArticleSlug,
        base_url: &str,
        now: Timestamp,
    ) -> Self {
        let url = format!("{}{}{}", base_url.trim_end_matches('/'), PREVIEW_PATH, id);
        Self {
            id,
            article_slug,
            url,
            created_at: now,
            last_activity_at: now,
            viewer_connected: false,
        }
    }

    pub fn id(&self) -> &PreviewSessionId {
        &self.id
    }

    pub fn article_slug(&self) -> &ArticleSlug {
        &self.article_slug
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn last_activity_at(&self) -> &Timestamp {
        &self.last_activity_at
    }

    /// Whether a live viewer was attached when this snapshot was taken.
    pub fn viewer_connected(&self) -> bool {
        self.viewer_connected
    }

    /// Records viewer activity at `now`.
    pub fn touch_at(&mut self, now: Timestamp) {
        if self.last_activity_at.is_before(&now) {
            self.last_activity_at = now;
        }
    }

    pub(crate) fn set_viewer_connected(&mut self, connected: bool) {
        self.viewer_connected = connected;
    }

    /// True when the session has been idle or alive too long at `now`.
    pub fn is_expired(&self, now: &Timestamp, policy: &ExpiryPolicy) -> bool {
        now.elapsed_since(&self.last_activity_at) > policy.idle_timeout
            || now.elapsed_since(&self.created_at) > policy.max_age
    }
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewStats {
    pub active_sessions: usize,
    pub capacity: usize,
    pub connected_viewers: usize,
}
