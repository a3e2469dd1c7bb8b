use dotenvy::dotenv;
use eyre::{Result, WrapErr, eyre};
use std::env;
use std::fmt;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where portfolio entries are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageMode::Postgres => write!(f, "postgres"),
            StorageMode::InMemory => write!(f, "in_memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_mode: StorageMode,
    pub database_url: Option<String>, // Required for postgres storage
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Loads configuration from the process environment (and `.env` if present)
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_mode = match lookup("STORAGE_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StorageMode::Postgres,
            Some("in_memory") => StorageMode::InMemory,
            Some(other) => {
                return Err(eyre!(
                    "Invalid STORAGE_MODE value '{other}' (must be 'postgres' or 'in_memory')"
                ));
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_mode == StorageMode::Postgres && database_url.is_none() {
            return Err(eyre!("Missing DATABASE_URL (required when STORAGE_MODE=postgres)"));
        }

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .wrap_err_with(|| format!("Invalid DB_MAX_CONNECTIONS value '{raw}'"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .wrap_err_with(|| format!("Invalid PORT value '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            storage_mode,
            database_url,
            db_max_connections,
            host,
            port,
        })
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .wrap_err_with(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
