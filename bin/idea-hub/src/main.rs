//! # Idea Hub Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use anyhow::Context;
use configs::{DatabaseSettings, LogSettings, Settings};
use ih_api::{configure_routes, AppState};
use ih_auth_simple::SimpleAuthenticator;
use ih_core::engine::Engine;
use ih_core::traits::{IdeaRepo, InteractionRepo};
use ih_storage_local::LocalBlobStore;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(not(any(feature = "db-sqlite", feature = "db-memory")))]
compile_error!("enable a database feature: db-sqlite or db-memory");

type Stores = (Arc<dyn IdeaRepo>, Arc<dyn InteractionRepo>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings.log);

    if settings.uses_development_secret() {
        warn!("auth.secret is the built-in development secret; set IDEAHUB__AUTH__SECRET");
    }

    let Settings {
        server,
        database,
        storage,
        auth,
        ..
    } = settings;

    // 1. Initialize Database Implementation
    let (ideas, interactions) = open_stores(&database).await?;
    let engine = Arc::new(Engine::new(ideas, interactions));

    // 2. Initialize Storage Implementation
    let blobs = LocalBlobStore::new(storage.root.clone(), storage.url_prefix.clone())
        .with_max_bytes(storage.max_image_bytes);

    // 3. Initialize Auth Implementation
    let authenticator = SimpleAuthenticator::new(auth.secret);

    let state = AppState {
        engine,
        blobs: Arc::new(blobs),
        auth: Arc::new(authenticator),
        upload_limit: storage.max_image_bytes,
    };

    let uploads = ServeDir::new(&storage.root);
    let app = match storage.url_prefix.trim_matches('/') {
        "" => configure_routes(state).fallback_service(uploads),
        prefix => configure_routes(state).nest_service(&format!("/{prefix}"), uploads),
    };

    let address = server.bind_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Idea Hub listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Idea Hub shut down");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(feature = "db-sqlite")]
async fn open_stores(database: &DatabaseSettings) -> anyhow::Result<Stores> {
    let store = Arc::new(
        ih_db_sqlite::SqliteStore::connect(&database.url, database.max_connections)
            .await
            .context("failed to open the SQLite store")?,
    );
    let ideas: Arc<dyn IdeaRepo> = store.clone();
    let interactions: Arc<dyn InteractionRepo> = store;
    Ok((ideas, interactions))
}

#[cfg(all(feature = "db-memory", not(feature = "db-sqlite")))]
async fn open_stores(_database: &DatabaseSettings) -> anyhow::Result<Stores> {
    warn!("using the in-memory store; all ideas and interactions are lost on exit");
    let store = Arc::new(ih_db_memory::MemoryStore::new());
    let ideas: Arc<dyn IdeaRepo> = store.clone();
    let interactions: Arc<dyn InteractionRepo> = store;
    Ok((ideas, interactions))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
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
