use dotenvy::dotenv;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use hptu_portafolio::api::{self, AppState};
use hptu_portafolio::config::{self, StorageMode};
use hptu_portafolio::db::db_manager::DbManager;
use hptu_portafolio::logging;
use hptu_portafolio::store::{PortfolioStore, memory::InMemoryPortfolioStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize logging
    if let Err(e) = logging::init_logging(env!("CARGO_BIN_NAME").to_string()) {
        eprintln!("Failed to initialize logging: {}", e);
        return Err(e);
    }

    let cfg = config::Config::load()?;
    info!(storage_mode = %cfg.storage_mode, "Configuration loaded and logging initialized");

    // Build the store explicitly and hand it to the router
    let store: Arc<dyn PortfolioStore> = match cfg.storage_mode {
        StorageMode::Postgres => {
            let db = DbManager::init(&cfg).await.wrap_err("Failed to initialize database")?;
            info!("Database connection pool created and schema initialized");
            Arc::new(db)
        }
        StorageMode::InMemory => Arc::new(InMemoryPortfolioStore::new()),
    };

    let app = api::router(AppState::new(store));

    let addr = cfg.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Portafolio server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
