//! Connection adapter binding a viewer transport to a preview session.
//!
//! One task per viewer runs [`attach`] for the lifetime of the connection:
//! 1. Register with the session (evicting any previous viewer)
//! 2. Send `connected` (failure here is `ConnectionFailed`)
//! 3. Wait for the session's signal queue to be released by the previous viewer
//! 4. Loop: inbound pings refresh activity, signals become `reload` frames
//! 5. On eviction or shutdown, send the goodbye frames
//! 6. Detach, unless a newer viewer already took over

use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::application::preview::{SessionRegistry, SignalReceiver, ViewerLease};
use crate::domain::foundation::{ArticleSlug, PreviewSessionId, ViewerId};
use crate::domain::preview::{CloseReason, PreviewError};
use crate::ports::{InboundFrame, TransportError, ViewerTransport};

use super::messages::{ClientMessage, ServerMessage};

/// Upper bound on the goodbye sequence (`expired` plus close frame).
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// How a viewer connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerExit {
    /// The server closed the connection.
    Evicted(CloseReason),
    /// The viewer closed the connection or went away.
    ClientClosed,
    /// Reading or writing failed; the session stays alive.
    TransportFailed,
}

/// Runs a viewer connection against `session_id` until it ends.
///
/// # Errors
///
/// - `SessionNotFound` if the session does not exist. The transport receives
///   a 4404 close frame first.
/// - `ConnectionFailed` if the `connected` message cannot be delivered. The
///   session stays alive.
pub async fn attach<T>(
    registry: &SessionRegistry,
    session_id: &PreviewSessionId,
    mut transport: T,
) -> Result<ViewerExit, PreviewError>
where
    T: ViewerTransport,
{
    let lease = match registry.register_viewer(session_id).await {
        Ok(lease) => lease,
        Err(err) => {
            tracing::debug!(session_id = %session_id, error = %err, "Viewer attach refused");
            close_transport(&mut transport, CloseReason::SessionNotFound).await;
            return Err(err);
        }
    };

    let ViewerLease {
        viewer_id,
        article_slug,
        signals,
        evicted,
        shutdown,
    } = lease;

    if let Err(e) = send_message(&mut transport, &ServerMessage::connected(session_id)).await {
        registry.detach_viewer(session_id, viewer_id).await;
        tracing::debug!(
            session_id = %session_id,
            viewer_id = %viewer_id,
            error = %e,
            "Failed to send connected message"
        );
        return Err(PreviewError::connection_failed(e.to_string()));
    }

    let connection = ViewerConnection {
        registry,
        session_id,
        viewer_id,
        article_slug: &article_slug,
        shutdown: &shutdown,
        evicted,
    };
    let exit = connection.run(&mut transport, signals).await;

    if let ViewerExit::Evicted(reason) = exit {
        say_goodbye(&mut transport, reason).await;
    }

    registry.detach_viewer(session_id, viewer_id).await;
    tracing::debug!(
        session_id = %session_id,
        viewer_id = %viewer_id,
        exit = ?exit,
        "Viewer connection finished"
    );

    Ok(exit)
}

struct ViewerConnection<'a> {
    registry: &'a SessionRegistry,
    session_id: &'a PreviewSessionId,
    viewer_id: ViewerId,
    article_slug: &'a ArticleSlug,
    shutdown: &'a CancellationToken,
    evicted: tokio::sync::oneshot::Receiver<CloseReason>,
}

impl ViewerConnection<'_> {
    async fn run<T: ViewerTransport>(mut self, transport: &mut T, signals: SignalReceiver) -> ViewerExit {
        // A superseded viewer still holds the queue until its loop exits.
        let mut signals = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return ViewerExit::Evicted(CloseReason::Shutdown),
            reason = &mut self.evicted => return ViewerExit::Evicted(eviction_reason(reason)),
            guard = signals.lock_owned() => guard,
        };

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    return ViewerExit::Evicted(CloseReason::Shutdown);
                }
                reason = &mut self.evicted => {
                    return ViewerExit::Evicted(eviction_reason(reason));
                }
                frame = transport.recv() => {
                    if let Some(exit) = self.handle_inbound(frame).await {
                        return exit;
                    }
                }
                signal = signals.recv() => {
                    if signal.is_none() {
                        // Every sender is gone: the session was removed.
                        return ViewerExit::Evicted(CloseReason::Deleted);
                    }
                    let reload = ServerMessage::reload(self.article_slug);
                    if let Err(e) = send_message(transport, &reload).await {
                        tracing::debug!(viewer_id = %self.viewer_id, error = %e, "Failed to send reload");
                        return ViewerExit::TransportFailed;
                    }
                    tracing::debug!(
                        session_id = %self.session_id,
                        viewer_id = %self.viewer_id,
                        article_slug = %self.article_slug,
                        "Reload sent"
                    );
                }
            }
        }
    }

    /// Returns `Some` when the frame ends the connection.
    async fn handle_inbound(
        &self,
        frame: Option<Result<InboundFrame, TransportError>>,
    ) -> Option<ViewerExit> {
        match frame {
            Some(Ok(InboundFrame::Text(text))) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {
                        tracing::trace!(viewer_id = %self.viewer_id, "Received ping");
                        self.registry.touch(self.session_id).await;
                    }
                    Err(_) => {
                        tracing::trace!(viewer_id = %self.viewer_id, "Ignoring unknown text frame");
                    }
                }
                None
            }
            Some(Ok(InboundFrame::Ping)) => {
                self.registry.touch(self.session_id).await;
                None
            }
            Some(Ok(InboundFrame::Pong)) => None,
            Some(Ok(InboundFrame::Binary(data))) => {
                tracing::debug!(
                    viewer_id = %self.viewer_id,
                    bytes = data.len(),
                    "Ignoring binary frame"
                );
                None
            }
            Some(Ok(InboundFrame::Close)) | None => {
                tracing::debug!(viewer_id = %self.viewer_id, "Viewer closed connection");
                Some(ViewerExit::ClientClosed)
            }
            Some(Err(e)) => {
                tracing::debug!(viewer_id = %self.viewer_id, error = %e, "Viewer receive error");
                Some(ViewerExit::TransportFailed)
            }
        }
    }
}

/// A dropped eviction sender means the registry entry is gone.
fn eviction_reason(received: Result<CloseReason, tokio::sync::oneshot::error::RecvError>) -> CloseReason {
    received.unwrap_or(CloseReason::Deleted)
}

async fn say_goodbye<T: ViewerTransport>(transport: &mut T, reason: CloseReason) {
    let goodbye = async {
        if reason.sends_expired_notice() {
            send_message(transport, &ServerMessage::expired(reason)).await?;
        }
        transport
            .close(reason.close_code(), reason.close_message())
            .await
    };

    match timeout(CLOSE_TIMEOUT, goodbye).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(reason = %reason, error = %e, "Viewer gone before close"),
        Err(_) => tracing::debug!(reason = %reason, "Close frame timed out"),
    }
}

async fn close_transport<T: ViewerTransport>(transport: &mut T, reason: CloseReason) {
    let close = transport.close(reason.close_code(), reason.close_message());
    match timeout(CLOSE_TIMEOUT, close).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(reason = %reason, error = %e, "Viewer gone before close"),
        Err(_) => tracing::debug!(reason = %reason, "Close frame timed out"),
    }
}

async fn send_message<T: ViewerTransport>(
    transport: &mut T,
    message: &ServerMessage,
) -> Result<(), TransportError> {
    let json = message
        .to_json()
        .map_err(|e| TransportError::Io(e.to_string()))?;
    transport.send_text(json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryArticleStore;
    use crate::adapters::websocket::transport::{channel_transport, OutboundFrame};
    use crate::application::preview::RegistrySettings;
    use std::sync::Arc;

    fn slug() -> ArticleSlug {
        ArticleSlug::new("my-draft").unwrap()
    }

    fn registry() -> Arc<SessionRegistry> {
        let store = InMemoryArticleStore::new().with_draft(slug(), "My Draft", "Body");
        Arc::new(SessionRegistry::new(
            Arc::new(store),
            RegistrySettings::default(),
        ))
    }

    #[tokio::test]
    async fn unknown_session_gets_4404_close() {
        let registry = registry();
        let (transport, mut peer) = channel_transport();

        let err = attach(&registry, &PreviewSessionId::generate(), transport)
            .await
            .unwrap_err();

        assert!(matches!(err, PreviewError::SessionNotFound(_)));
        assert_eq!(
            peer.recv().await,
            Some(OutboundFrame::Close {
                code: 4404,
                reason: "preview session not found".to_string()
            })
        );
    }

    #[tokio::test]
    async fn client_close_detaches_and_keeps_session() {
        let registry = registry();
        let session = registry.create_session(&slug()).await.unwrap();
        let (transport, mut peer) = channel_transport();

        let task = {
            let registry = Arc::clone(&registry);
            let id = session.id().clone();
            tokio::spawn(async move { attach(&registry, &id, transport).await })
        };

        let connected = peer.recv().await.unwrap().as_message().unwrap();
        assert!(matches!(connected, ServerMessage::Connected(_)));
        assert_eq!(registry.stats().await.connected_viewers, 1);

        peer.send(InboundFrame::Close);
        assert_eq!(task.await.unwrap().unwrap(), ViewerExit::ClientClosed);

        assert_eq!(registry.stats().await.connected_viewers, 0);
        assert!(registry.get_session(session.id()).await.is_ok());
    }

    #[tokio::test]
    async fn ping_refreshes_activity() {
        let registry = registry();
        let session = registry.create_session(&slug()).await.unwrap();
        let (transport, mut peer) = channel_transport();

        let task = {
            let registry = Arc::clone(&registry);
            let id = session.id().clone();
            tokio::spawn(async move { attach(&registry, &id, transport).await })
        };
        peer.recv().await.unwrap();
        let before = *registry.get_session(session.id()).await.unwrap().last_activity_at();

        tokio::time::sleep(Duration::from_millis(10)).await;
        peer.send_text(r#"{"type":"ping"}"#);
        peer.send_text("garbage");
        peer.send(InboundFrame::Binary(vec![1, 2, 3]));
        drop(peer);
        assert_eq!(task.await.unwrap().unwrap(), ViewerExit::ClientClosed);

        let after = *registry.get_session(session.id()).await.unwrap().last_activity_at();
        assert!(before.is_before(&after));
    }

    #[tokio::test]
    async fn shutdown_sends_1001_close() {
        let registry = registry();
        let session = registry.create_session(&slug()).await.unwrap();
        let (transport, mut peer) = channel_transport();

        let task = {
            let registry = Arc::clone(&registry);
            let id = session.id().clone();
            tokio::spawn(async move { attach(&registry, &id, transport).await })
        };
        peer.recv().await.unwrap();

        registry.shutdown().await;

        assert_eq!(
            task.await.unwrap().unwrap(),
            ViewerExit::Evicted(CloseReason::Shutdown)
        );
        assert_eq!(
            peer.recv().await,
            Some(OutboundFrame::Close {
                code: 1001,
                reason: "server shutting down".to_string()
            })
        );
    }

    #[tokio::test]
    async fn failed_transport_keeps_session_alive() {
        let registry = registry();
        let session = registry.create_session(&slug()).await.unwrap();
        let (transport, peer) = channel_transport();
        drop(peer);

        let err = attach(&registry, session.id(), transport).await.unwrap_err();

        assert!(matches!(err, PreviewError::ConnectionFailed(_)));
        assert_eq!(err.kind(), crate::domain::preview::PreviewErrorKind::ConnectionFailed);
        assert!(registry.get_session(session.id()).await.is_ok());
        assert_eq!(registry.stats().await.connected_viewers, 0);
    }
}
