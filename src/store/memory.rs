use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{PortfolioStore, StoreError, TariffUpdate};
use crate::portafolio::{PortafolioChanges, PortafolioEntry};

/// Process-local store keyed by primary code.
///
/// Every mutation holds the write lock for its whole duration, so a batch is
/// validated and applied without another request observing it half-done.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioStore {
    entries: RwLock<BTreeMap<String, PortafolioEntry>>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for InMemoryPortfolioStore {
    async fn create(&self, entry: PortafolioEntry) -> Result<PortafolioEntry, StoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.codigo_hptu) {
            return Err(StoreError::DuplicateKey(entry.codigo_hptu));
        }
        entries.insert(entry.codigo_hptu.clone(), entry.clone());
        Ok(entry)
    }

    async fn get(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError> {
        self.entries
            .read()
            .await
            .get(codigo_hptu)
            .cloned()
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))
    }

    async fn list(&self) -> Result<Vec<PortafolioEntry>, StoreError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn list_by_group(
        &self,
        grupo_concepto: &str,
    ) -> Result<Vec<PortafolioEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.grupo_concepto.as_deref() == Some(grupo_concepto))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        codigo_hptu: &str,
        changes: PortafolioChanges,
    ) -> Result<PortafolioEntry, StoreError> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(codigo_hptu)
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))?;
        changes.apply_to(entry);
        Ok(entry.clone())
    }

    async fn delete(&self, codigo_hptu: &str) -> Result<PortafolioEntry, StoreError> {
        self.entries
            .write()
            .await
            .remove(codigo_hptu)
            .ok_or_else(|| StoreError::record_not_found(codigo_hptu))
    }

    async fn batch_update_tariff(
        &self,
        updates: Vec<TariffUpdate>,
    ) -> Result<Vec<PortafolioEntry>, StoreError> {
        if updates.is_empty() {
            return Err(StoreError::empty_batch());
        }

        let mut entries = self.entries.write().await;
        if let Some(missing) = updates.iter().find(|u| !entries.contains_key(&u.codigo_hptu)) {
            return Err(StoreError::record_not_found(&missing.codigo_hptu));
        }

        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(entry) = entries.get_mut(&update.codigo_hptu) {
                entry.tarifa_2025_bo = Some(update.tarifa_2025_bo);
                updated.push(entry.clone());
            }
        }
        Ok(updated)
    }
}
