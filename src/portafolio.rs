//! Portfolio entries (one row of the HPTU tariff catalog) and the
//! tariff-adjustment operations built on top of a [`PortfolioStore`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::store::{PortfolioStore, StoreError, TariffUpdate};
use crate::tariff::{self, AdjustmentMode, TariffError};

/// One catalog row. `codigo_hptu` is the immutable primary key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortafolioEntry {
    #[serde(rename = "codigoHPTU")]
    pub codigo_hptu: String,
    pub grupo_concepto: Option<String>, // Group key used by bulk tariff adjustments
    pub descripcion_grupo_concepto: Option<String>,
    #[serde(rename = "conceptoHPTU")]
    pub concepto_hptu: Option<String>,
    pub descripcion_concepto: Option<String>,
    pub codigo_reemplazo_2025: Option<String>,
    #[serde(rename = "descripcionHPTU")]
    pub descripcion_hptu: Option<String>,
    #[serde(rename = "tarifa2025BO", with = "rust_decimal::serde::float_option")]
    pub tarifa_2025_bo: Option<Decimal>, // Currency amount with cents
    pub grupo_quirurgico: Option<String>,
    pub codigo_conversion_externo: Option<String>,
    pub descripcion_manual_externo: Option<String>,
    pub codigo_cups_asociado: Option<String>,
    pub pbs_no_pbs: Option<String>,
    pub aseguradora: Option<String>,
    pub codigo_reps_3100: Option<String>,
    pub observacion_a_terceros: Option<String>,
    pub incluye: Option<String>,
    pub excluye: Option<String>,
    pub observaciones_generales: Option<String>,
}

impl PortafolioEntry {
    pub fn new(codigo_hptu: impl Into<String>) -> Self {
        Self {
            codigo_hptu: codigo_hptu.into(),
            ..Default::default()
        }
    }

    /// Rounds the tariff to the catalog's precision, rejecting values the
    /// tariff column cannot hold
    pub fn normalized(mut self) -> Result<Self, TariffError> {
        self.tarifa_2025_bo = self.tarifa_2025_bo.map(tariff::check_tariff).transpose()?;
        Ok(self)
    }
}

// Distinguishes a field sent as `null` (Some(None)) from an absent one (None)
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn explicit_tariff<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Some)
}

/// Partial update of an entry: `None` leaves a column untouched,
/// `Some(None)` clears it. The primary code cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortafolioChanges {
    #[serde(deserialize_with = "explicit")]
    pub grupo_concepto: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub descripcion_grupo_concepto: Option<Option<String>>,
    #[serde(rename = "conceptoHPTU", deserialize_with = "explicit")]
    pub concepto_hptu: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub descripcion_concepto: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub codigo_reemplazo_2025: Option<Option<String>>,
    #[serde(rename = "descripcionHPTU", deserialize_with = "explicit")]
    pub descripcion_hptu: Option<Option<String>>,
    #[serde(rename = "tarifa2025BO", deserialize_with = "explicit_tariff")]
    pub tarifa_2025_bo: Option<Option<Decimal>>,
    #[serde(deserialize_with = "explicit")]
    pub grupo_quirurgico: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub codigo_conversion_externo: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub descripcion_manual_externo: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub codigo_cups_asociado: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub pbs_no_pbs: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub aseguradora: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub codigo_reps_3100: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub observacion_a_terceros: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub incluye: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub excluye: Option<Option<String>>,
    #[serde(deserialize_with = "explicit")]
    pub observaciones_generales: Option<Option<String>>,
}

impl PortafolioChanges {
    pub fn tariff_only(tarifa: Decimal) -> Self {
        Self {
            tarifa_2025_bo: Some(Some(tarifa)),
            ..Default::default()
        }
    }

    pub fn normalized(mut self) -> Result<Self, TariffError> {
        if let Some(Some(tarifa)) = self.tarifa_2025_bo {
            self.tarifa_2025_bo = Some(Some(tariff::check_tariff(tarifa)?));
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes the provided fields into `entry`
    pub fn apply_to(self, entry: &mut PortafolioEntry) {
        fn set<T>(slot: &mut Option<T>, change: Option<Option<T>>) {
            if let Some(value) = change {
                *slot = value;
            }
        }

        set(&mut entry.grupo_concepto, self.grupo_concepto);
        set(&mut entry.descripcion_grupo_concepto, self.descripcion_grupo_concepto);
        set(&mut entry.concepto_hptu, self.concepto_hptu);
        set(&mut entry.descripcion_concepto, self.descripcion_concepto);
        set(&mut entry.codigo_reemplazo_2025, self.codigo_reemplazo_2025);
        set(&mut entry.descripcion_hptu, self.descripcion_hptu);
        set(&mut entry.tarifa_2025_bo, self.tarifa_2025_bo);
        set(&mut entry.grupo_quirurgico, self.grupo_quirurgico);
        set(&mut entry.codigo_conversion_externo, self.codigo_conversion_externo);
        set(&mut entry.descripcion_manual_externo, self.descripcion_manual_externo);
        set(&mut entry.codigo_cups_asociado, self.codigo_cups_asociado);
        set(&mut entry.pbs_no_pbs, self.pbs_no_pbs);
        set(&mut entry.aseguradora, self.aseguradora);
        set(&mut entry.codigo_reps_3100, self.codigo_reps_3100);
        set(&mut entry.observacion_a_terceros, self.observacion_a_terceros);
        set(&mut entry.incluye, self.incluye);
        set(&mut entry.excluye, self.excluye);
        set(&mut entry.observaciones_generales, self.observaciones_generales);
    }
}

#[derive(Debug, Error)]
pub enum AdjustmentError {
    #[error(transparent)]
    Tariff(#[from] TariffError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Adjusts the tariff of a single entry and persists only that column.
///
/// Read and write are separate store calls: two concurrent adjustments of
/// the same code resolve last-write-wins.
#[instrument(skip(store), fields(on_close = true))]
pub async fn adjust_tariff(
    store: &dyn PortfolioStore,
    codigo_hptu: &str,
    mode: AdjustmentMode,
    operand: Decimal,
) -> Result<PortafolioEntry, AdjustmentError> {
    let entry = store.get(codigo_hptu).await?;
    let new_tarifa = tariff::adjust(entry.tarifa_2025_bo, mode, operand)?;

    let updated = store
        .update(codigo_hptu, PortafolioChanges::tariff_only(new_tarifa))
        .await?;

    info!(
        codigo_hptu,
        previous = ?entry.tarifa_2025_bo,
        tarifa = %new_tarifa,
        "Adjusted tariff"
    );
    Ok(updated)
}

/// Adjusts every entry of a group in one all-or-nothing batch
#[instrument(skip(store), fields(on_close = true))]
pub async fn adjust_group_tariff(
    store: &dyn PortfolioStore,
    grupo_concepto: &str,
    mode: AdjustmentMode,
    operand: Decimal,
) -> Result<Vec<PortafolioEntry>, AdjustmentError> {
    let entries = store.list_by_group(grupo_concepto).await?;
    if entries.is_empty() {
        return Err(StoreError::group_not_found(grupo_concepto).into());
    }

    let updates = entries
        .iter()
        .map(|entry| {
            Ok(TariffUpdate {
                codigo_hptu: entry.codigo_hptu.clone(),
                tarifa_2025_bo: tariff::adjust(entry.tarifa_2025_bo, mode, operand)?,
            })
        })
        .collect::<Result<Vec<_>, TariffError>>()?;

    let updated = store.batch_update_tariff(updates).await?;

    info!(grupo_concepto, updated = updated.len(), "Adjusted group tariffs");
    Ok(updated)
}
