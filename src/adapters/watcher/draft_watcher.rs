//! Drafts directory watcher.
//!
//! Watches the drafts directory with `notify`, batches create/modify events
//! for markdown files over a short debounce window, resolves each file to
//! its slug and notifies the listener once per slug.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::adapters::storage::FsArticleStore;
use crate::domain::foundation::ArticleSlug;
use crate::ports::DraftChangeListener;

/// Quiet period before a burst of events is flushed.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(150);

/// Errors starting the watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to initialize file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("failed to watch {path}: {source}")]
    Watch {
        path: String,
        #[source]
        source: notify::Error,
    },
}

/// Feeds draft saves on disk into a [`DraftChangeListener`].
pub struct DraftWatcher {
    store: FsArticleStore,
    listener: Arc<dyn DraftChangeListener>,
    debounce: Duration,
}

impl DraftWatcher {
    pub fn new(store: FsArticleStore, listener: Arc<dyn DraftChangeListener>) -> Self {
        Self {
            store,
            listener,
            debounce: WATCH_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Starts watching and spawns the event loop.
    ///
    /// Fails up front if the directory cannot be watched.
    pub fn spawn(self, shutdown: CancellationToken) -> Result<JoinHandle<()>, WatchError> {
        let (tx, rx) = mpsc::channel(128);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if tx.blocking_send(res).is_err() {
                tracing::trace!("Draft watch channel closed");
            }
        })
        .map_err(WatchError::Init)?;

        let dir = self.store.drafts_dir().to_path_buf();
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: dir.display().to_string(),
                source,
            })?;

        tracing::info!(drafts_dir = %dir.display(), "Watching drafts directory");
        Ok(tokio::spawn(self.run(watcher, rx, shutdown)))
    }

    async fn run(
        self,
        // Dropping the watcher stops event delivery.
        _watcher: RecommendedWatcher,
        mut rx: mpsc::Receiver<notify::Result<Event>>,
        shutdown: CancellationToken,
    ) {
        let mut pending: HashSet<PathBuf> = HashSet::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                incoming = rx.recv() => {
                    match incoming {
                        Some(Ok(event)) => {
                            if !is_content_change(&event.kind) {
                                continue;
                            }
                            let drafts: Vec<PathBuf> =
                                event.paths.into_iter().filter(|p| is_markdown(p)).collect();
                            if !drafts.is_empty() {
                                pending.extend(drafts);
                                deadline = Some(Instant::now() + self.debounce);
                            }
                        }
                        Some(Err(err)) => {
                            tracing::warn!(error = %err, "Draft watcher error");
                        }
                        None => break,
                    }
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    let batch = std::mem::take(&mut pending);
                    self.flush(batch).await;
                }
            }
        }

        tracing::info!("Draft watcher stopped");
    }

    async fn flush(&self, paths: HashSet<PathBuf>) {
        let mut slugs: HashMap<ArticleSlug, PathBuf> = HashMap::new();
        for path in paths {
            if let Some(slug) = self.store.slug_for_path(&path).await {
                slugs.entry(slug).or_insert(path);
            }
        }

        for (slug, path) in slugs {
            tracing::debug!(article_slug = %slug, file = %path.display(), "Draft changed on disk");
            self.listener.draft_changed(&slug).await;
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn is_markdown(path: &std::path::Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}
