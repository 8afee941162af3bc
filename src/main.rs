use break_3c::{AppState, Backend, Config, EntryStore, dates::LocalClock, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let backend = Backend::select(config.storage, &config.data_dir).await;
    let store = EntryStore::new(backend);
    let entries = store.load().await;
    info!(
        count = entries.len(),
        persistent = store.backend().is_persistent(),
        "entries loaded"
    );

    let app = router(AppState::new(store, entries, Arc::new(LocalClock)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
