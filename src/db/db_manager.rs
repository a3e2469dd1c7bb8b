use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use super::connection;
use super::schema;
use super::queries::portafolio as portafolio_queries;
use crate::config::Config;
use crate::portafolio::{PortafolioChanges, PortafolioEntry};
use crate::store::{PortfolioStore, StoreError, TariffUpdate};

/// Postgres-backed portfolio store
pub struct DbManager {
    pub pool: PgPool,
}

impl DbManager {
    /// Creates a new database connection and initializes the schema
    pub async fn init(config: &Config) -> eyre::Result<Self> {
        let pool = connection::create_pool(config).await?;

        // Ensure schema is initialized (creates tables if needed)
        schema::init_schema(&pool).await?;

        Ok(Self { pool })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl PortfolioStore for DbManager {
    async fn create(&self, entry: PortafolioEntry) -> Result<PortafolioEntry, StoreError> {
        match portafolio_queries::insert_portafolio(&self.pool, &entry).await {
            Ok(model) => Ok(model.into()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicateKey(entry.codigo_hptu))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError> {
        portafolio_queries::get_portafolio_by_code(&self.pool, codigo_hptu)
            .await?
            .map(PortafolioEntry::from)
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))
    }

    async fn list(&self) -> Result<Vec<PortafolioEntry>, StoreError> {
        let rows = portafolio_queries::get_all_portafolio(&self.pool).await?;
        Ok(rows.into_iter().map(PortafolioEntry::from).collect())
    }

    async fn list_by_group(
        &self,
        grupo_concepto: &str,
    ) -> Result<Vec<PortafolioEntry>, StoreError> {
        let rows =
            portafolio_queries::get_portafolio_by_group(&self.pool, grupo_concepto).await?;
        Ok(rows.into_iter().map(PortafolioEntry::from).collect())
    }

    async fn update(
        &self,
        codigo_hptu: &str,
        changes: PortafolioChanges,
    ) -> Result<PortafolioEntry, StoreError> {
        portafolio_queries::update_portafolio(&self.pool, codigo_hptu, changes)
            .await?
            .map(PortafolioEntry::from)
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))
    }

    async fn delete(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError> {
        portafolio_queries::delete_portafolio(&self.pool, codigo_hptu)
            .await?
            .map(PortafolioEntry::from)
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))
    }

    #[instrument(skip_all, fields(on_close = true, rows = updates.len()))]
    async fn batch_update_tariff(
        &self,
        updates: Vec<TariffUpdate>,
    ) -> Result<Vec<PortafolioEntry>, StoreError> {
        if updates.is_empty() {
            return Err(StoreError::empty_batch());
        }

        // Dropping the transaction without commit rolls every update back
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(updates.len());

        for update in &updates {
            let row = portafolio_queries::update_tarifa(
                &mut *tx,
                &update.codigo_hptu,
                update.tarifa_2025_bo,
            )
            .await?;
            match row {
                Some(model) => updated.push(PortafolioEntry::from(model)),
                None => {
                    warn!(
                        codigo_hptu = %update.codigo_hptu,
                        "Row vanished during batch tariff update, rolling back"
                    );
                    return Err(StoreError::record_not_found(&update.codigo_hptu));
                }
            }
        }

        tx.commit().await?;
        debug!(rows = updated.len(), "Committed batch tariff update");

        Ok(updated)
    }
}
