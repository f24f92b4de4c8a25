//! Trivia night binary entrypoint wiring the REST, SSE and store layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_night::{
    config::{AppConfig, StoreConfig},
    dao::{
        storage::StorageError,
        trivia_store::{TriviaStore, memory::InMemoryTriviaStore},
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store_config = config.store.clone();
    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        connect_store(store_config.clone())
    }));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the configured store.
async fn connect_store(config: StoreConfig) -> Result<Arc<dyn TriviaStore>, StorageError> {
    match config {
        StoreConfig::Memory { seed_path } => {
            let store = InMemoryTriviaStore::from_seed_file(&seed_path)?;
            info!(path = %seed_path.display(), "using in-memory store");
            Ok(Arc::new(store))
        }
        StoreConfig::Postgrest => connect_postgrest().await,
    }
}

#[cfg(feature = "postgrest-store")]
async fn connect_postgrest() -> Result<Arc<dyn TriviaStore>, StorageError> {
    use trivia_night::dao::trivia_store::postgrest::{PostgrestConfig, PostgrestTriviaStore};

    let config = PostgrestConfig::from_env()?;
    let store = PostgrestTriviaStore::connect(config).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgrest-store"))]
async fn connect_postgrest() -> Result<Arc<dyn TriviaStore>, StorageError> {
    Err(StorageError::unavailable(
        "built without the `postgrest-store` feature".to_string(),
        std::io::Error::from(std::io::ErrorKind::Unsupported),
    ))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
