//! Draft preview server binary.

use std::error::Error;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use draft_preview::adapters::{
    preview_router, DraftWatcher, FsArticleStore, OriginPolicy, PreviewAppState,
};
use draft_preview::application::{ExpirySweeper, SessionRegistry};
use draft_preview::config::AppConfig;
use draft_preview::ports::{ArticleStore, DraftChangeListener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config)?;

    let addr = config.server.socket_addr()?;
    let preview = &config.preview;

    let store = FsArticleStore::new(&preview.drafts_dir);
    let articles: Arc<dyn ArticleStore> = Arc::new(store.clone());
    let registry = Arc::new(SessionRegistry::new(
        Arc::clone(&articles),
        preview.registry_settings(),
    ));

    let mut app = axum::Router::new();
    let mut background = Vec::new();
    if preview.enabled {
        background.push(
            ExpirySweeper::new(Arc::clone(&registry))
                .with_interval(preview.sweep_interval())
                .spawn(),
        );

        if preview.watch_drafts {
            let listener: Arc<dyn DraftChangeListener> = registry.clone();
            match DraftWatcher::new(store, listener).spawn(registry.shutdown_token()) {
                Ok(handle) => background.push(handle),
                Err(e) => tracing::warn!(error = %e, "Drafts watcher disabled"),
            }
        }

        let origins = OriginPolicy::new(&preview.base_url, &preview.allowed_origins_list());
        let state = PreviewAppState::new(Arc::clone(&registry), articles, origins);
        app = app.merge(preview_router().with_state(state));
    } else {
        tracing::info!("Preview service disabled");
    }
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        environment = ?config.server.environment,
        max_sessions = preview.max_sessions,
        "Draft preview server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&registry)))
        .await?;

    for handle in background {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }
    tracing::info!("Draft preview server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter; JSON output in production.
fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.server.log_level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}

/// Resolves on Ctrl-C after closing every live viewer, so open sockets
/// do not hold up the HTTP drain.
async fn shutdown_signal(registry: Arc<SessionRegistry>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    registry.shutdown().await;
}
