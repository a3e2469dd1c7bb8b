//! Storage contract for portfolio entries.

pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::portafolio::{PortafolioChanges, PortafolioEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("Ya existe un registro con código {0}")]
    DuplicateKey(String),
    #[error("Store failure: {0}")]
    Failure(String),
}

impl StoreError {
    pub fn record_not_found(codigo_hptu: &str) -> Self {
        StoreError::NotFound(format!("Registro con código {codigo_hptu} no encontrado"))
    }

    pub fn group_not_found(grupo_concepto: &str) -> Self {
        StoreError::NotFound(format!(
            "No se encontraron registros para el grupo {grupo_concepto}"
        ))
    }

    pub fn empty_batch() -> Self {
        StoreError::NotFound("No hay registros para actualizar".to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Failure(err.to_string())
    }
}

/// New tariff for one entry inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct TariffUpdate {
    pub codigo_hptu: String,
    pub tarifa_2025_bo: Decimal,
}

/// Single-table repository of portfolio entries.
///
/// Listings are ordered by primary code.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Inserts a new entry; `DuplicateKey` if the code already exists
    async fn create(&self, entry: PortafolioEntry) -> Result<PortafolioEntry, StoreError>;

    async fn get(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError>;

    async fn list(&self) -> Result<Vec<PortafolioEntry>, StoreError>;

    /// Entries whose group code equals `grupo_concepto`, possibly none
    async fn list_by_group(&self, grupo_concepto: &str) -> Result<Vec<PortafolioEntry>, StoreError>;

    /// Applies only the provided fields
    async fn update(
        &self,
        codigo_hptu: &str,
        changes: PortafolioChanges,
    ) -> Result<PortafolioEntry, StoreError>;

    /// Removes the entry and returns it as it was
    async fn delete(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError>;

    /// Writes every tariff or none of them. An empty batch is `NotFound`,
    /// as is any code that no longer exists.
    async fn batch_update_tariff(
        &self,
        updates: Vec<TariffUpdate>,
    ) -> Result<Vec<PortafolioEntry>, StoreError>;
}
