use std::sync::Arc;

use anyhow::{Context, Result};
use lorcana_shop::{
    build_router,
    config::{AppConfig, StoreBackend},
    cors::CorsPolicy,
    state::AppState,
    store::{InMemoryStore, MongoStore, Store},
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;

    let store = match config.store_backend {
        StoreBackend::MongoDb => {
            info!("store backend: mongodb");
            let mongo = MongoStore::connect(&config.mongo)
                .await
                .context("failed to connect to MongoDB")?;
            Store::shared(Arc::new(mongo))
        }
        StoreBackend::InMemory => {
            warn!("store backend: in-memory, data is lost on shutdown");
            Store::shared(Arc::new(InMemoryStore::new()))
        }
    };

    let state = AppState::new(store, CorsPolicy::new(config.allowed_origins.clone()));

    state
        .pricing
        .ensure_default_pricing()
        .await
        .context("failed to initialize default pricing settings")?;

    let app = build_router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, origins = ?config.allowed_origins, "lorcana shop backend started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lorcana_shop=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
