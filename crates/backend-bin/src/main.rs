use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use courses_backend_lib::{
    config::{Settings, StorageKind, DEFAULT_CONFIG_FILE},
    router,
    storage::{FlatFileStorage, MemoryStorage, Storage},
    AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Courses API server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the bind address from the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Configuration errors, including a missing token secret, stop startup.
    let mut settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings);
    tracing::info!(?settings, "configuration loaded");

    match settings.storage {
        StorageKind::File => {
            let storage = FlatFileStorage::new(&settings.data_dir)
                .with_context(|| format!("opening data dir {}", settings.data_dir.display()))?;
            serve(storage, settings).await
        },
        StorageKind::Memory => serve(MemoryStorage::new(), settings).await,
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn serve<S: Storage + Clone + 'static>(storage: S, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(storage, settings)?);
    let app = router::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
