use std::sync::Arc;

use anyhow::Context;
use portfolio_cms::{
    build_router,
    config::AppConfig,
    store::JsonFileStore,
    AppState,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let store = JsonFileStore::new(&config.data_dir);
    store
        .ensure_seeded()
        .with_context(|| format!("preparing data dir {}", config.data_dir.display()))?;

    let static_dir = config.static_dir.is_dir().then(|| config.static_dir.clone());
    let app = build_router(AppState::new(Arc::new(store)), static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;

    info!("server running at http://{}", config.bind);
    info!("api base: http://{}/api", config.bind);
    info!(data_dir = %config.data_dir.display(), "serving collections");
    match &static_dir {
        Some(dir) => info!(static_dir = %dir.display(), "serving static files"),
        None => info!(static_dir = %config.static_dir.display(), "static dir not found, api only"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}
