use dotenvy::dotenv;
use eyre::{Result, eyre};
use tracing::info;

use hptu_portafolio::logging;
use hptu_portafolio::config::{self, StorageMode};
use hptu_portafolio::db::{
    connection,
    schema,
};

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
    if cfg.storage_mode != StorageMode::Postgres {
        return Err(eyre!(
            "init_db_schema requires STORAGE_MODE=postgres (got {})",
            cfg.storage_mode
        ));
    }
    info!("Configuration loaded and logging initialized");

    // Initialize database connection pool
    let pool = connection::create_pool(&cfg).await?;
    info!("Database connection pool created");

    // Initialize database schema
    schema::init_schema(&pool).await?;
    info!("Database schema initialized");

    pool.close().await;
    Ok(())
}
