//! SessionRegistry - In-memory store of live preview sessions.
//!
//! The registry is the single synchronization point of the preview service.
//! Every mutation (create, delete, touch, viewer attach/detach, expiry)
//! goes through its methods and is serialized by one `RwLock`.
//!
//! # Live-update channel
//!
//! ```text
//! notify_changed(slug) ──try_send──► [ capacity 1 ] ──► viewer loop ──► "reload"
//!                                        full? already pending, drop
//! ```
//!
//! Each session owns one bounded queue with room for a single unit signal.
//! Notifications that arrive while a signal is pending coalesce into it.
//! The receiving half outlives individual viewers, so a signal raised while
//! nobody is attached is delivered to the next viewer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::domain::foundation::{ArticleSlug, PreviewSessionId, Timestamp, ViewerId};
use crate::domain::preview::{
    CloseReason, ExpiryPolicy, PreviewError, PreviewSession, PreviewStats,
};
use crate::ports::{ArticleStore, DraftChangeListener};

/// How many fresh IDs to try before giving up on a collision streak.
const MAX_ID_ATTEMPTS: usize = 8;

/// Settings consumed by the registry.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Maximum number of live sessions.
    pub capacity: usize,
    /// Prefix for session URLs; empty yields relative URLs.
    pub base_url: String,
    pub expiry: ExpiryPolicy,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            capacity: 50,
            base_url: String::new(),
            expiry: ExpiryPolicy::default(),
        }
    }
}

impl RegistrySettings {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Shared receiving half of a session's signal queue.
pub type SignalReceiver = Arc<Mutex<mpsc::Receiver<()>>>;

/// Registry-side handle on an attached viewer.
struct ViewerHandle {
    id: ViewerId,
    evict: oneshot::Sender<CloseReason>,
}

struct SessionEntry {
    session: PreviewSession,
    signal_tx: mpsc::Sender<()>,
    signal_rx: SignalReceiver,
    viewer: Option<ViewerHandle>,
}

impl SessionEntry {
    fn new(session: PreviewSession) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel(1);
        Self {
            session,
            signal_tx,
            signal_rx: Arc::new(Mutex::new(signal_rx)),
            viewer: None,
        }
    }

    fn snapshot(&self) -> PreviewSession {
        let mut session = self.session.clone();
        session.set_viewer_connected(self.viewer.is_some());
        session
    }

    /// Detaches the current viewer, telling it why.
    fn evict_viewer(&mut self, reason: CloseReason) -> Option<ViewerId> {
        let viewer = self.viewer.take()?;
        // The viewer loop may already be gone; nothing to do then.
        let _ = viewer.evict.send(reason);
        Some(viewer.id)
    }
}

/// Everything a connection loop needs after attaching to a session.
pub struct ViewerLease {
    pub viewer_id: ViewerId,
    pub article_slug: ArticleSlug,
    /// Lock before reading; the previous viewer releases it on exit.
    pub signals: SignalReceiver,
    /// Fires once when the registry detaches this viewer.
    pub evicted: oneshot::Receiver<CloseReason>,
    pub shutdown: CancellationToken,
}

/// Concurrency-safe store of preview sessions keyed by ID.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PreviewSessionId, SessionEntry>>,
    articles: Arc<dyn ArticleStore>,
    settings: RegistrySettings,
    shutdown: CancellationToken,
    generate_id: fn() -> PreviewSessionId,
}

impl SessionRegistry {
    pub fn new(articles: Arc<dyn ArticleStore>, settings: RegistrySettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            articles,
            settings,
            shutdown: CancellationToken::new(),
            generate_id: PreviewSessionId::generate,
        }
    }

    /// Replaces the ID source; used to exercise collision handling.
    #[cfg(test)]
    fn with_id_source(mut self, generate_id: fn() -> PreviewSessionId) -> Self {
        self.generate_id = generate_id;
        self
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Creates a session previewing `slug`.
    ///
    /// # Errors
    ///
    /// - `ArticleNotFound` if no draft has this slug
    /// - `CapacityExceeded` if the registry is full
    /// - `IdGeneration` if no unique ID could be allocated
    pub async fn create_session(&self, slug: &ArticleSlug) -> Result<PreviewSession, PreviewError> {
        if !self.articles.draft_exists(slug).await {
            tracing::debug!(article_slug = %slug, "Preview requested for unknown draft");
            return Err(PreviewError::ArticleNotFound(slug.clone()));
        }

        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.settings.capacity {
            tracing::info!(
                article_slug = %slug,
                capacity = self.settings.capacity,
                "Preview session refused at capacity"
            );
            return Err(PreviewError::CapacityExceeded {
                capacity: self.settings.capacity,
            });
        }

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| (self.generate_id)())
            .find(|candidate| !sessions.contains_key(candidate))
            .ok_or_else(|| {
                tracing::error!(article_slug = %slug, "Exhausted preview session id attempts");
                PreviewError::IdGeneration
            })?;

        let session = PreviewSession::new(id.clone(), slug.clone(), &self.settings.base_url);
        sessions.insert(id.clone(), SessionEntry::new(session.clone()));

        tracing::info!(
            session_id = %id,
            article_slug = %slug,
            active_sessions = sessions.len(),
            "Preview session created"
        );

        Ok(session)
    }

    /// Returns a snapshot of a live session.
    ///
    /// Sessions that are expired but not yet swept count as absent.
    pub async fn get_session(&self, id: &PreviewSessionId) -> Result<PreviewSession, PreviewError> {
        let now = Timestamp::now();
        let sessions = self.sessions.read().await;

        sessions
            .get(id)
            .filter(|entry| !entry.session.is_expired(&now, &self.settings.expiry))
            .map(SessionEntry::snapshot)
            .ok_or_else(|| PreviewError::SessionNotFound(id.clone()))
    }

    /// Removes a session and tells its viewer to send `expired` and close.
    ///
    /// An expired but unswept session is removed as expired and reported
    /// as `SessionNotFound`.
    pub async fn delete_session(&self, id: &PreviewSessionId) -> Result<(), PreviewError> {
        let now = Timestamp::now();
        let mut entry = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| PreviewError::SessionNotFound(id.clone()))?;

        if entry.session.is_expired(&now, &self.settings.expiry) {
            let viewer_id = entry.evict_viewer(CloseReason::Expired);
            tracing::info!(
                session_id = %id,
                article_slug = %entry.session.article_slug(),
                viewer_id = ?viewer_id,
                "Preview session expired"
            );
            return Err(PreviewError::SessionNotFound(id.clone()));
        }

        let viewer_id = entry.evict_viewer(CloseReason::Deleted);
        tracing::info!(
            session_id = %id,
            article_slug = %entry.session.article_slug(),
            viewer_id = ?viewer_id,
            "Preview session deleted"
        );
        Ok(())
    }

    /// Refreshes the session's activity time.
    ///
    /// Unknown and already expired sessions are left alone.
    pub async fn touch(&self, id: &PreviewSessionId) {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions
            .get_mut(id)
            .filter(|entry| !entry.session.is_expired(&now, &self.settings.expiry))
        {
            entry.session.touch_at(now);
        }
    }

    /// Attaches a new viewer to a session, evicting any previous one.
    pub async fn register_viewer(&self, id: &PreviewSessionId) -> Result<ViewerLease, PreviewError> {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;

        let entry = sessions
            .get_mut(id)
            .filter(|entry| !entry.session.is_expired(&now, &self.settings.expiry))
            .ok_or_else(|| PreviewError::SessionNotFound(id.clone()))?;

        if let Some(previous) = entry.evict_viewer(CloseReason::Superseded) {
            tracing::info!(
                session_id = %id,
                viewer_id = %previous,
                "Preview viewer superseded by new connection"
            );
        }

        let viewer_id = ViewerId::new();
        let (evict, evicted) = oneshot::channel();
        entry.viewer = Some(ViewerHandle {
            id: viewer_id,
            evict,
        });
        entry.session.touch_at(now);

        tracing::info!(session_id = %id, viewer_id = %viewer_id, "Preview viewer attached");

        Ok(ViewerLease {
            viewer_id,
            article_slug: entry.session.article_slug().clone(),
            signals: Arc::clone(&entry.signal_rx),
            evicted,
            shutdown: self.shutdown.clone(),
        })
    }

    /// Detaches `viewer_id` if it is still the session's viewer.
    ///
    /// Returns false when the session is gone or another viewer took over.
    pub async fn detach_viewer(&self, id: &PreviewSessionId, viewer_id: ViewerId) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.get_mut(id) else {
            return false;
        };

        match &entry.viewer {
            Some(viewer) if viewer.id == viewer_id => {
                entry.viewer = None;
                tracing::info!(session_id = %id, viewer_id = %viewer_id, "Preview viewer detached");
                true
            }
            _ => false,
        }
    }

    /// Signals every session watching `slug` that the draft changed.
    ///
    /// Never blocks. Returns the number of sessions matched.
    pub async fn notify_changed(&self, slug: &ArticleSlug) -> usize {
        let sessions = self.sessions.read().await;
        let mut matched = 0;
        let mut coalesced = 0;

        for entry in sessions
            .values()
            .filter(|entry| entry.session.article_slug() == slug)
        {
            matched += 1;
            match entry.signal_tx.try_send(()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(())) => coalesced += 1,
                // The registry holds the receiver, so this cannot happen while
                // the entry exists.
                Err(mpsc::error::TrySendError::Closed(())) => {}
            }
        }

        tracing::debug!(
            article_slug = %slug,
            matched,
            coalesced,
            "Draft change notified"
        );
        matched
    }

    pub async fn stats(&self) -> PreviewStats {
        let sessions = self.sessions.read().await;
        PreviewStats {
            active_sessions: sessions.len(),
            capacity: self.settings.capacity,
            connected_viewers: sessions.values().filter(|e| e.viewer.is_some()).count(),
        }
    }

    /// IDs of sessions that are stale at `now`.
    pub async fn expired_session_ids(&self, now: Timestamp) -> Vec<PreviewSessionId> {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.session.is_expired(&now, &self.settings.expiry))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Removes the session if it is still stale at `now`.
    ///
    /// A session touched since it was found stale survives.
    pub async fn expire_if_stale(&self, id: &PreviewSessionId, now: Timestamp) -> bool {
        let mut sessions = self.sessions.write().await;
        let stale = sessions
            .get(id)
            .is_some_and(|entry| entry.session.is_expired(&now, &self.settings.expiry));
        if !stale {
            return false;
        }

        if let Some(mut entry) = sessions.remove(id) {
            let viewer_id = entry.evict_viewer(CloseReason::Expired);
            tracing::info!(
                session_id = %id,
                article_slug = %entry.session.article_slug(),
                viewer_id = ?viewer_id,
                "Preview session expired"
            );
        }
        true
    }

    /// Removes every session that is stale at `now`.
    pub async fn sweep_at(&self, now: Timestamp) -> usize {
        let candidates = self.expired_session_ids(now).await;
        let mut removed = 0;
        for id in &candidates {
            if self.expire_if_stale(id, now).await {
                removed += 1;
            }
        }
        removed
    }

    /// Removes every session that is stale now.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Timestamp::now()).await
    }

    /// Tears down all sessions and closes all viewers. Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        let mut closed_viewers = 0;
        for (_, mut entry) in drained {
            if entry.evict_viewer(CloseReason::Shutdown).is_some() {
                closed_viewers += 1;
            }
        }

        tracing::info!(closed_viewers, "Preview session registry shut down");
    }

    /// False once `shutdown` has been called.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Token cancelled by `shutdown`; background tasks stop on it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[async_trait]
impl DraftChangeListener for SessionRegistry {
    async fn draft_changed(&self, slug: &ArticleSlug) {
        self.notify_changed(slug).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryArticleStore;
    use crate::domain::preview::PreviewErrorKind;
    use std::collections::HashSet;
    use std::time::Duration;

    fn slug(s: &str) -> ArticleSlug {
        ArticleSlug::new(s).unwrap()
    }

    fn store_with(slugs: &[&str]) -> Arc<InMemoryArticleStore> {
        let store = slugs.iter().fold(InMemoryArticleStore::new(), |store, s| {
            store.with_draft(slug(s), "Title", "Body")
        });
        Arc::new(store)
    }

    fn registry_with(capacity: usize, slugs: &[&str]) -> SessionRegistry {
        SessionRegistry::new(
            store_with(slugs),
            RegistrySettings::default().with_capacity(capacity),
        )
    }

    fn short_expiry() -> ExpiryPolicy {
        ExpiryPolicy {
            idle_timeout: Duration::from_secs(60),
            max_age: Duration::from_secs(600),
        }
    }

    #[tokio::test]
    async fn created_sessions_have_unique_ids_and_are_retrievable() {
        let registry = registry_with(10, &["my-draft"]);
        let mut ids = HashSet::new();

        for _ in 0..5 {
            let session = registry.create_session(&slug("my-draft")).await.unwrap();
            assert!(ids.insert(session.id().clone()));
            let fetched = registry.get_session(session.id()).await.unwrap();
            assert_eq!(fetched.article_slug(), &slug("my-draft"));
        }
    }

    #[tokio::test]
    async fn created_session_url_uses_base_url() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_base_url("https://blog.example.com"),
        );

        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        assert_eq!(
            session.url(),
            format!("https://blog.example.com/preview/{}", session.id())
        );
    }

    #[tokio::test]
    async fn unknown_draft_is_refused_and_leaves_registry_unchanged() {
        let registry = registry_with(10, &["my-draft"]);

        let err = registry.create_session(&slug("missing")).await.unwrap_err();

        assert_eq!(err.kind(), PreviewErrorKind::NotFound);
        assert_eq!(registry.stats().await.active_sessions, 0);
    }

    #[tokio::test]
    async fn capacity_is_enforced_and_freed_by_delete() {
        let registry = registry_with(2, &["a", "b", "c"]);

        let a = registry.create_session(&slug("a")).await.unwrap();
        registry.create_session(&slug("b")).await.unwrap();
        let err = registry.create_session(&slug("c")).await.unwrap_err();
        assert_eq!(err.kind(), PreviewErrorKind::CapacityExceeded);

        registry.delete_session(a.id()).await.unwrap();
        registry.create_session(&slug("c")).await.unwrap();
        let err = registry.create_session(&slug("c")).await.unwrap_err();
        assert_eq!(err.kind(), PreviewErrorKind::CapacityExceeded);

        let stats = registry.stats().await;
        assert_eq!(stats.active_sessions, 2);
        assert_eq!(stats.capacity, 2);
    }

    #[tokio::test]
    async fn concurrent_creates_never_exceed_capacity() {
        let registry = Arc::new(registry_with(5, &["my-draft"]));
        let mut handles = Vec::new();
        for _ in 0..20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.create_session(&slug("my-draft")).await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 5);
        assert_eq!(registry.stats().await.active_sessions, 5);
    }

    #[tokio::test]
    async fn deleted_session_is_not_found() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        registry.delete_session(session.id()).await.unwrap();

        let err = registry.get_session(session.id()).await.unwrap_err();
        assert_eq!(err.kind(), PreviewErrorKind::NotFound);
        let err = registry.delete_session(session.id()).await.unwrap_err();
        assert_eq!(err.kind(), PreviewErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_evicts_viewer_with_deleted_reason() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        let lease = registry.register_viewer(session.id()).await.unwrap();

        registry.delete_session(session.id()).await.unwrap();

        assert_eq!(lease.evicted.await.unwrap(), CloseReason::Deleted);
    }

    #[tokio::test]
    async fn second_viewer_supersedes_first() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        let first = registry.register_viewer(session.id()).await.unwrap();
        let second = registry.register_viewer(session.id()).await.unwrap();

        assert_eq!(first.evicted.await.unwrap(), CloseReason::Superseded);
        assert_ne!(first.viewer_id, second.viewer_id);
        assert_eq!(registry.stats().await.connected_viewers, 1);
    }

    #[tokio::test]
    async fn stale_viewer_cannot_detach_its_successor() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        let first = registry.register_viewer(session.id()).await.unwrap();
        let second = registry.register_viewer(session.id()).await.unwrap();

        assert!(!registry.detach_viewer(session.id(), first.viewer_id).await);
        assert!(registry.get_session(session.id()).await.unwrap().viewer_connected());
        assert!(registry.detach_viewer(session.id(), second.viewer_id).await);
        assert!(!registry.get_session(session.id()).await.unwrap().viewer_connected());
    }

    #[tokio::test]
    async fn register_viewer_on_unknown_session_fails() {
        let registry = registry_with(10, &["my-draft"]);
        let err = registry
            .register_viewer(&PreviewSessionId::generate())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), PreviewErrorKind::NotFound);
    }

    #[tokio::test]
    async fn notifications_coalesce_into_one_pending_signal() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        for _ in 0..3 {
            assert_eq!(registry.notify_changed(&slug("my-draft")).await, 1);
        }

        let lease = registry.register_viewer(session.id()).await.unwrap();
        let mut signals = lease.signals.lock().await;
        assert!(signals.try_recv().is_ok());
        assert!(signals.try_recv().is_err());
    }

    #[tokio::test]
    async fn notify_reaches_every_session_for_slug_only() {
        let registry = registry_with(10, &["a", "b"]);
        registry.create_session(&slug("a")).await.unwrap();
        registry.create_session(&slug("a")).await.unwrap();
        registry.create_session(&slug("b")).await.unwrap();

        assert_eq!(registry.notify_changed(&slug("a")).await, 2);
        assert_eq!(registry.notify_changed(&slug("b")).await, 1);
        assert_eq!(registry.notify_changed(&slug("other")).await, 0);
    }

    #[tokio::test]
    async fn draft_change_listener_forwards_to_notify() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        let listener: &dyn DraftChangeListener = &registry;
        listener.draft_changed(&slug("my-draft")).await;

        let lease = registry.register_viewer(session.id()).await.unwrap();
        assert!(lease.signals.lock().await.try_recv().is_ok());
    }

    #[tokio::test]
    async fn sweep_removes_idle_sessions_and_evicts_viewers() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_expiry(short_expiry()),
        );
        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        let lease = registry.register_viewer(session.id()).await.unwrap();

        let later = Timestamp::now().plus(Duration::from_secs(120));
        assert_eq!(registry.sweep_at(later).await, 1);

        assert_eq!(lease.evicted.await.unwrap(), CloseReason::Expired);
        assert_eq!(registry.stats().await.active_sessions, 0);
    }

    #[tokio::test]
    async fn sweep_keeps_fresh_sessions() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_expiry(short_expiry()),
        );
        registry.create_session(&slug("my-draft")).await.unwrap();

        assert_eq!(registry.sweep().await, 0);
        assert_eq!(registry.stats().await.active_sessions, 1);
    }

    #[tokio::test]
    async fn touched_session_survives_recheck() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_expiry(short_expiry()),
        );
        let session = registry.create_session(&slug("my-draft")).await.unwrap();

        let stale_at = Timestamp::now().plus(Duration::from_secs(61));
        assert_eq!(registry.expired_session_ids(stale_at).await.len(), 1);

        registry.touch(session.id()).await;
        let recheck_at = Timestamp::now().plus(Duration::from_secs(30));
        assert!(!registry.expire_if_stale(session.id(), recheck_at).await);
        assert!(registry.get_session(session.id()).await.is_ok());
    }

    fn tiny_expiry() -> ExpiryPolicy {
        ExpiryPolicy {
            idle_timeout: Duration::from_millis(20),
            max_age: Duration::from_secs(600),
        }
    }

    #[tokio::test]
    async fn expired_session_is_not_revived_by_touch() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_expiry(tiny_expiry()),
        );
        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(matches!(
            registry.get_session(session.id()).await,
            Err(PreviewError::SessionNotFound(_))
        ));

        registry.touch(session.id()).await;

        assert!(matches!(
            registry.get_session(session.id()).await,
            Err(PreviewError::SessionNotFound(_))
        ));
        assert!(registry.register_viewer(session.id()).await.is_err());
        assert_eq!(registry.sweep().await, 1);
    }

    #[tokio::test]
    async fn deleting_expired_session_reports_not_found_and_removes_it() {
        let registry = SessionRegistry::new(
            store_with(&["my-draft"]),
            RegistrySettings::default().with_expiry(tiny_expiry()),
        );
        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        let lease = registry.register_viewer(session.id()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let result = registry.delete_session(session.id()).await;

        assert!(matches!(result, Err(PreviewError::SessionNotFound(_))));
        assert_eq!(lease.evicted.await.unwrap(), CloseReason::Expired);
        assert_eq!(registry.stats().await.active_sessions, 0);
    }

    #[tokio::test]
    async fn touch_on_unknown_session_is_ignored() {
        let registry = registry_with(10, &[]);
        registry.touch(&PreviewSessionId::generate()).await;
    }

    #[tokio::test]
    async fn shutdown_drains_sessions_and_is_idempotent() {
        let registry = registry_with(10, &["my-draft"]);
        let session = registry.create_session(&slug("my-draft")).await.unwrap();
        let lease = registry.register_viewer(session.id()).await.unwrap();
        assert!(registry.is_running());

        registry.shutdown().await;
        registry.shutdown().await;

        assert!(!registry.is_running());
        assert!(lease.shutdown.is_cancelled());
        assert_eq!(lease.evicted.await.unwrap(), CloseReason::Shutdown);
        assert_eq!(registry.stats().await.active_sessions, 0);
    }

    fn fixed_id() -> PreviewSessionId {
        "session_00000000000000000000000000000001".parse().unwrap()
    }

    #[tokio::test]
    async fn colliding_ids_are_refused_after_retries() {
        let registry = registry_with(10, &["my-draft"]).with_id_source(fixed_id);

        registry.create_session(&slug("my-draft")).await.unwrap();
        let err = registry.create_session(&slug("my-draft")).await.unwrap_err();

        assert_eq!(err, PreviewError::IdGeneration);
        assert_eq!(err.kind(), PreviewErrorKind::Internal);
        assert_eq!(registry.stats().await.active_sessions, 1);
    }
}
